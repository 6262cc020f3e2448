use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use comercio_core::{CustomerId, OrderId};
use comercio_orders::{OrderDraft, OrderLineDraft, OrderStatus, Payment, PaymentMethod};

use crate::app::routes::common::ensure_tenant;
use crate::app::{errors, services::AppServices};
use crate::context::TenantScope;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(place_order))
        .route("/:code", get(get_order))
        .route("/:code/estado", put(set_order_status))
}

#[derive(Debug, Deserialize)]
struct PaymentRequest {
    monto_cents: i64,
    metodo: PaymentMethod,
    #[serde(default)]
    referencia: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceOrderRequest {
    #[serde(default)]
    cliente: Option<i64>,
    lines: Vec<OrderLineDraft>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    pago: Option<PaymentRequest>,
}

async fn list_orders(
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
        Json(serde_json::json!({ "items": services.orders.list(tenant) })),
    )
        .into_response()
}

async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path(tenant): Path<i64>,
    Json(body): Json<PlaceOrderRequest>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    // A named customer must exist before any stock moves.
    let customer = match body.cliente {
        Some(code) => {
            let code = CustomerId::new(code);
            if let Err(e) = services.customers.get(tenant, code) {
                return errors::domain_error_to_response(e);
            }
            Some(code)
        }
        None => None,
    };

    let draft = OrderDraft {
        customer,
        lines: body.lines,
        notes: body.notes,
    };
    let order = match services.orders.place(tenant, draft, &services.products) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Some(pago) = body.pago {
        let payment = match Payment::new(
            order.code,
            pago.monto_cents,
            pago.metodo,
            pago.referencia,
            Utc::now(),
        ) {
            Ok(payment) => payment,
            Err(e) => return errors::domain_error_to_response(e),
        };
        if let Err(e) = services.orders.record_payment(tenant, payment) {
            return errors::domain_error_to_response(e);
        }
    }

    (StatusCode::CREATED, Json(order)).into_response()
}

async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let code = OrderId::new(code);
    let order = match services.orders.get(tenant, code) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let payments = services.orders.payments(tenant, code).unwrap_or_default();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "pedido": order, "pagos": payments })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    estado: OrderStatus,
}

async fn set_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(scope): Extension<TenantScope>,
    Path((tenant, code)): Path<(i64, i64)>,
    Json(body): Json<SetStatusRequest>,
) -> axum::response::Response {
    let tenant = match ensure_tenant(&scope, tenant) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    match services
        .orders
        .set_status(tenant, OrderId::new(code), body.estado, &services.products)
    {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
