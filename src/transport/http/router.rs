use crate::domain::category::{
    CategorySource, CreateCategoryRequest, EventCategory, UpdateCategoryRequest,
};
use crate::transport::http::handlers::{categories, health};
use crate::transport::http::types::ApiResponse;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        health::readiness_handler,
        categories::list_handler,
        categories::get_handler,
        categories::create_handler,
        categories::update_handler,
        categories::delete_handler
    ),
    components(schemas(
        ApiResponse,
        EventCategory,
        CategorySource,
        CreateCategoryRequest,
        UpdateCategoryRequest
    )),
    tags((name = "event-categories", description = "Event category CRUD with soft delete"))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/ready", get(health::readiness_handler))
        .route(
            "/api/v1/event-categories",
            get(categories::list_handler).post(categories::create_handler),
        )
        .route(
            "/api/v1/event-categories/:id",
            get(categories::get_handler)
                .put(categories::update_handler)
                .delete(categories::delete_handler),
        )
        .with_state(app_state)
}
