use crate::domain::category::CategoryService;
use crate::domain::repository::RepoError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryService>,
    /// Pinged by `/ready`; `None` when running on the in-memory store.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(categories: Arc<CategoryService>) -> Self {
        Self {
            categories,
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Serializes `data` into a success envelope with `status`.
pub fn respond<T: Serialize>(status: StatusCode, data: &T) -> Result<Response, ApiError> {
    let value = serde_json::to_value(data).map_err(ApiError::Serialization)?;
    Ok((status, Json(ApiResponse::ok(value))).into_response())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid JSON body: {0} (expected: {1})")]
    InvalidBody(String, &'static str),

    #[error("response serialization failed: {0}")]
    Serialization(serde_json::Error),
}

impl ApiError {
    pub fn invalid_body(err: JsonRejection, expected: &'static str) -> Self {
        ApiError::InvalidBody(err.body_text(), expected)
    }

    pub fn invalid_query(err: QueryRejection) -> Self {
        ApiError::BadRequest(format!("invalid query string: {}", err.body_text()))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Repo(RepoError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Repo(RepoError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Repo(RepoError::Validation(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidBody(..) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Repo(RepoError::Persistence(_)) | ApiError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ApiResponse::error(message))).into_response()
    }
}
