//! Session endpoints. Authentication itself happens at the external
//! identity provider; these endpoints trust its verified uid and bind
//! it to a company, answering with the `UserSession` snapshot (company
//! embedded, token minted for that tenant).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use comercio_auth::Role;
use comercio_core::{DomainError, EmployeeId, TenantId};

use crate::app::{errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/verify-user-empresa", post(verify_user_empresa))
        .route("/register-user-empresa", post(register_user_empresa))
        .route("/empresas-usuario/:uid", get(empresas_usuario))
}

#[derive(Debug, Deserialize)]
struct VerifyUserRequest {
    uid: String,
    empresa_codigo: i64,
}

#[derive(Debug, Deserialize)]
struct RegisterUserRequest {
    uid: String,
    name: String,
    empresa_codigo: i64,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    employee_codigo: Option<i64>,
}

async fn verify_user_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<VerifyUserRequest>,
) -> axum::response::Response {
    let tenant = TenantId::new(body.empresa_codigo);
    match services.session_for(&body.uid, tenant) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        // Membership misses read as "not registered here", not as a
        // permission problem.
        Err(DomainError::Unauthorized(_)) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("user is not registered with company {tenant}"),
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Companies the identified user belongs to. Feeds the selection
/// screen shown after login when the user has more than one company.
async fn empresas_usuario(
    Extension(services): Extension<Arc<AppServices>>,
    Path(uid): Path<String>,
) -> axum::response::Response {
    let Some(user) = services.users.find_by_uid(&uid) else {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("user {uid} is not registered"),
        );
    };
    let memberships = match services.memberships.companies_of(user.code) {
        Ok(memberships) => memberships,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let items: Vec<serde_json::Value> = memberships
        .into_iter()
        .filter_map(|m| {
            // A company deleted after registration is skipped.
            let company = services.companies.get(m.tenant).ok()?;
            Some(serde_json::json!({
                "empresa": company,
                "role": m.role.as_str(),
            }))
        })
        .collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

async fn register_user_empresa(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterUserRequest>,
) -> axum::response::Response {
    let tenant = TenantId::new(body.empresa_codigo);
    if !services.companies.exists(tenant) {
        return errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("company {tenant}"),
        );
    }

    let user = match services.users.get_or_create(&body.uid, &body.name) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let employee = body.employee_codigo.map(EmployeeId::new);
    if let Some(code) = employee {
        if let Err(e) = services.employees.get(tenant, code) {
            return errors::domain_error_to_response(e);
        }
    }

    let role = body.role.unwrap_or_else(Role::employee);
    match services.memberships.register(user.code, tenant, employee, role) {
        Ok(membership) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "user_codigo": user.code,
                "empresa_codigo": membership.tenant,
                "role": membership.role.as_str(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
