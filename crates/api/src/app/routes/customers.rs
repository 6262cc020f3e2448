use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use comercio_core::CustomerId;
use comercio_customers::{CustomerDraft, CustomerUpdate};

use crate::app::routes::common::ensure_tenant;
use crate::app::{errors, services::AppServices};
use crate::context::TenantScope;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/resumen", get(customer_summaries))
        .route(
            "/:code",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn list_customers(
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
        Json(serde_json::json!({ "items": services.customers.list(tenant) })),
    )
        .into_response()
}

async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
    Json(body): Json<CustomerDraft>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.customers.create(tenant, body) {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Order count and lifetime totals for every customer of the company.
async fn customer_summaries(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let items: Vec<serde_json::Value> = services
        .customers
        .list(tenant)
        .into_iter()
        .map(|c| {
            let summary = services.orders.summary_for(tenant, c.code);
            serde_json::json!({
                "cliente": c,
                "resumen": summary,
            })
        })
        .collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.customers.get(tenant, CustomerId::new(code)) {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
    Json(body): Json<CustomerUpdate>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.customers.update(tenant, CustomerId::new(code), &body) {
        Ok(customer) => (StatusCode::OK, Json(customer)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.customers.delete(tenant, CustomerId::new(code)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
