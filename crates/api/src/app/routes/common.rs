use axum::http::StatusCode;

use comercio_core::TenantId;

use crate::app::errors;
use crate::context::{PrincipalContext, TenantScope};

/// The tenant named in the path must be the tenant the token was
/// issued for. Nothing else ever supplies the tenant id.
pub fn ensure_tenant(
    scope: &TenantScope,
    path_tenant: i64,
) -> Result<TenantId, axum::response::Response> {
    let requested = TenantId::new(path_tenant);
    if requested != scope.tenant_id() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "tenant_isolation",
            format!(
                "token is scoped to company {}, not {requested}",
                scope.tenant_id()
            ),
        ));
    }
    Ok(requested)
}

/// Administrator gate: `Administrador` or `SuperAdministrador`.
pub fn require_admin(principal: &PrincipalContext) -> Result<(), axum::response::Response> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "administrator role required",
        ))
    }
}

/// Super-administrator gate.
pub fn require_super_admin(principal: &PrincipalContext) -> Result<(), axum::response::Response> {
    if principal.is_super_admin() {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "super administrator role required",
        ))
    }
}
