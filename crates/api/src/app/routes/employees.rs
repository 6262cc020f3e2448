use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use comercio_core::EmployeeId;
use comercio_employees::{EmployeeDraft, EmployeeUpdate, PositionDraft};

use crate::app::routes::common::{ensure_tenant, require_admin};
use crate::app::{errors, services::AppServices};
use crate::context::{PrincipalContext, TenantScope};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route("/cargos", get(list_positions).post(create_position))
        .route(
            "/:code",
            get(get_employee).put(update_employee).delete(deactivate_employee),
        )
}

async fn list_employees(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    (
        StatusCode::OK,
        Json(serde_json::json!({ "items": services.employees.list(tenant) })),
    )
        .into_response()
}

async fn create_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Extension(principal): Extension<PrincipalContext>,
    Path(tenant): Path<i64>,
    Json(body): Json<EmployeeDraft>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&principal) {
        return resp;
    }
    match services.employees.create(tenant, body) {
        Ok(employee) => (StatusCode::CREATED, Json(employee)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn list_positions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    (
        StatusCode::OK,
        Json(serde_json::json!({ "items": services.employees.list_positions(tenant) })),
    )
        .into_response()
}

async fn create_position(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Extension(principal): Extension<PrincipalContext>,
    Path(tenant): Path<i64>,
    Json(body): Json<PositionDraft>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&principal) {
        return resp;
    }
    match services.employees.create_position(tenant, body) {
        Ok(position) => (StatusCode::CREATED, Json(position)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn get_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.employees.get(tenant, EmployeeId::new(code)) {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn update_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Extension(principal): Extension<PrincipalContext>,
    Path((tenant, code)): Path<(i64, i64)>,
    Json(body): Json<EmployeeUpdate>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&principal) {
        return resp;
    }
    match services.employees.update(tenant, EmployeeId::new(code), &body) {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Employees are never removed from record; DELETE marks them inactive.
async fn deactivate_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Extension(principal): Extension<PrincipalContext>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&principal) {
        return resp;
    }
    match services.employees.deactivate(tenant, EmployeeId::new(code)) {
        Ok(employee) => (StatusCode::OK, Json(employee)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
