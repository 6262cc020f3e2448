use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use comercio_companies::{CompanyDraft, CompanyUpdate};
use comercio_core::TenantId;

use crate::app::routes::common::require_super_admin;
use crate::app::{errors, services::AppServices};
use crate::context::{PrincipalContext, TenantScope};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route("/validar-ruc/:ruc", get(validate_ruc))
        .route(
            "/:code",
            get(get_company).put(update_company).delete(delete_company),
        )
}

/// RUC availability check for the registration form. Any authenticated
/// principal may ask; the answer leaks nothing beyond existence.
async fn validate_ruc(
    Extension(services): Extension<Arc<AppServices>>,
    Path(ruc): Path<String>,
) -> axum::response::Response {
    let exists = services.companies.ruc_exists(&ruc);
    (
        StatusCode::OK,
        Json(serde_json::json!({ "ruc": ruc, "disponible": !exists })),
    )
        .into_response()
}

async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = require_super_admin(&principal) {
        return resp;
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "items": services.companies.list() })),
    )
        .into_response()
}

async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CompanyDraft>,
) -> axum::response::Response {
    if let Err(resp) = require_super_admin(&principal) {
        return resp;
    }
    match services.companies.register(body) {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Extension(principal): Extension<PrincipalContext>,
    Path(code): Path<i64>,
) -> axum::response::Response {
    let code = TenantId::new(code);
    // A company is visible to its own members and to super admins.
    if code != scope.tenant_id() && !principal.is_super_admin() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "tenant_isolation",
            format!("token is scoped to company {}, not {code}", scope.tenant_id()),
        );
    }
    match services.companies.get(code) {
        Ok(company) => (StatusCode::OK, Json(company)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Extension(principal): Extension<PrincipalContext>,
    Path(code): Path<i64>,
    Json(body): Json<CompanyUpdate>,
) -> axum::response::Response {
    let code = TenantId::new(code);
    // Admins may edit their own company; super admins may edit any.
    let own_company = code == scope.tenant_id() && principal.is_admin();
    if !own_company && !principal.is_super_admin() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "administrator role required",
        );
    }
    match services.companies.update(code, body) {
        Ok(company) => (StatusCode::OK, Json(company)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(code): Path<i64>,
) -> axum::response::Response {
    if let Err(resp) = require_super_admin(&principal) {
        return resp;
    }
    match services.companies.delete(TenantId::new(code)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
