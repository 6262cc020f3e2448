//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: repositories, stores, and the token codec
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let jwt = Arc::new(comercio_auth::Hs256Jwt::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt: jwt.clone() };

    let services = Arc::new(services::build_services(jwt).await);

    // Protected routes: require auth + tenant context.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Session endpoints stay public: they are how a token is obtained.
    let public = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router())
        .layer(Extension(services));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(ServiceBuilder::new())
}
