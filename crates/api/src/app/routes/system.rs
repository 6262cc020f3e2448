use axum::{http::StatusCode, response::IntoResponse, Json};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    axum::extract::Extension(scope): axum::extract::Extension<crate::context::TenantScope>,
    axum::extract::Extension(principal): axum::extract::Extension<crate::context::PrincipalContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "tenant_id": scope.tenant_id(),
        "user_id": principal.user_id(),
        "role": principal.role().map(|r| r.as_str()),
    }))
}
