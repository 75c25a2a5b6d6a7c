use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is alive", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse::ok(serde_json::json!({ "status": "ok" }))),
    )
}

#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Service is ready (store reachable)", body = ApiResponse),
        (status = 503, description = "Service is not ready (store unreachable)", body = ApiResponse)
    )
)]
pub async fn readiness_handler(State(state): State<AppState>) -> impl IntoResponse {
    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({ "status": "ready", "store": "memory" }))),
        );
    };

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({ "status": "ready", "store": "postgres" }))),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    success: false,
                    data: Some(serde_json::json!({ "status": "unavailable" })),
                    error: Some(format!("DB ping failed: {}", e)),
                }),
            )
        }
    }
}
