use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use comercio_core::ProductId;
use comercio_products::{ProductDraft, ProductUpdate};

use crate::app::routes::common::ensure_tenant;
use crate::app::{errors, services::AppServices};
use crate::context::TenantScope;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:code",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(
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
        Json(serde_json::json!({ "items": services.products.list(tenant) })),
    )
        .into_response()
}

async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
    Json(body): Json<ProductDraft>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.products.create(tenant, body) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.products.get(tenant, ProductId::new(code)) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
    Json(body): Json<ProductUpdate>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.products.update(tenant, ProductId::new(code), &body) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services.products.delete(tenant, ProductId::new(code)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
