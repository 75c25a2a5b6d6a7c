use crate::domain::category::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::transport::http::types::{respond, ApiError, AppState};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest("invalid event category id".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/event-categories",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number (default 1)"),
        ("size" = Option<u32>, Query, description = "Items per page (default 20, clamped to 100)"),
        ("sort" = Option<Vec<String>>, Query, description = "Repeatable `field,ASC|DESC`; fields: id, source, tenant_id, name, created_at, updated_at"),
        ("name" = Option<String>, Query, description = "Equality filter"),
        ("source" = Option<String>, Query, description = "Equality filter (app or tenant)"),
        ("tenant_id" = Option<String>, Query, description = "Equality filter")
    ),
    responses(
        (status = 200, description = "Page of active event categories", body = ApiResponse),
        (status = 400, description = "Malformed page, size or sort", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_handler(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) = query.map_err(ApiError::invalid_query)?;
    let page = state.categories.list_from_query(&pairs).await?;
    respond(StatusCode::OK, &page)
}

#[utoipa::path(
    get,
    path = "/api/v1/event-categories/{id}",
    params(
        ("id" = String, Path, description = "Event category UUID")
    ),
    responses(
        (status = 200, description = "Event category", body = ApiResponse),
        (status = 400, description = "Invalid ID format", body = ApiResponse),
        (status = 404, description = "Event category not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let category = state.categories.get(id).await?;
    respond(StatusCode::OK, &category)
}

#[utoipa::path(
    post,
    path = "/api/v1/event-categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Event category created", body = ApiResponse),
        (status = 400, description = "Validation error", body = ApiResponse),
        (status = 409, description = "Conflict (already exists)", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_handler(
    State(state): State<AppState>,
    request: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(|e| {
        ApiError::invalid_body(e, "{\"source\": \"app|tenant\", \"tenant_id\"?: uuid, \"name\": string}")
    })?;
    let category = state.categories.create(request).await?;
    respond(StatusCode::CREATED, &category)
}

#[utoipa::path(
    put,
    path = "/api/v1/event-categories/{id}",
    params(
        ("id" = String, Path, description = "Event category UUID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Event category updated", body = ApiResponse),
        (status = 400, description = "Invalid ID or validation error", body = ApiResponse),
        (status = 404, description = "Event category not found", body = ApiResponse),
        (status = 409, description = "Conflict (name already used)", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = request.map_err(|e| {
        ApiError::invalid_body(e, "{\"source\"?: \"app|tenant\", \"tenant_id\"?: uuid, \"name\"?: string}")
    })?;
    let category = state.categories.update(id, request).await?;
    respond(StatusCode::OK, &category)
}

#[utoipa::path(
    delete,
    path = "/api/v1/event-categories/{id}",
    params(
        ("id" = String, Path, description = "Event category UUID")
    ),
    responses(
        (status = 204, description = "Event category soft-deleted"),
        (status = 400, description = "Invalid ID format", body = ApiResponse),
        (status = 404, description = "Event category not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
