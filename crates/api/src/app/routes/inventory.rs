//! Inventory views over the product catalog: current stock, the
//! field-level audit trail, and direct stock adjustment.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use comercio_core::ProductId;

use crate::app::routes::common::ensure_tenant;
use crate::app::{errors, services::AppServices};
use crate::context::TenantScope;

pub fn router() -> Router {
    Router::new()
        .route("/", get(stock_view))
        .route("/historial", get(history_view))
        .route("/:code/stock", put(set_stock))
}

async fn stock_view(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let items: Vec<serde_json::Value> = services
        .products
        .list(tenant)
        .into_iter()
        .map(|p| {
            serde_json::json!({
                "codigo": p.code,
                "nombre": p.name,
                "stock": p.stock,
                "estado": p.effective_status(),
            })
        })
        .collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

async fn history_view(
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
        Json(serde_json::json!({ "items": services.products.full_history(tenant) })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct SetStockRequest {
    stock: u32,
}

async fn set_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
    Json(body): Json<SetStockRequest>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    // The repository resolves the delta under its catalog lock so a
    // concurrent placement cannot slip between the read and the write.
    match services
        .products
        .set_stock(tenant, ProductId::new(code), body.stock)
    {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
