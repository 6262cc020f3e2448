use axum::{routing::get, Router};

pub mod auth;
pub mod common;
pub mod companies;
pub mod customers;
pub mod employees;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/empresas", companies::router())
        .nest("/company/:tenant_id/productos", products::router())
        .nest("/company/:tenant_id/inventario", inventory::router())
        .nest("/company/:tenant_id/pedidos", orders::router())
        .nest("/company/:tenant_id/clientes", customers::router())
        .nest("/company/:tenant_id/empleados", employees::router())
}
