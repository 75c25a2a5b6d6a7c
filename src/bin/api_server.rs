// src/bin/api_server.rs

use anyhow::Context;
use guest_management::domain::category::CategoryService;
use guest_management::infra::config::Settings;
use guest_management::storage::postgres::category::{
    ensure_event_category_schema, event_category_repository,
};
use guest_management::transport;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining in-flight requests...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default filter.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,guest_management=debug")),
        )
        .init();

    let settings = Settings::from_env()?;

    // --- Database ---
    tracing::info!(max_connections = settings.db_max_connections, "connecting to Postgres");
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(&settings.database_url)
        .await
        .context("failed to connect to Postgres")?;
    ensure_event_category_schema(&pool)
        .await
        .context("failed to prepare event_categories schema")?;

    // --- Services ---
    let categories = CategoryService::new(event_category_repository(pool.clone()));
    let app_state = transport::http::AppState::new(Arc::new(categories)).with_pool(pool);

    // --- API Server ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    tracing::info!(addr = %settings.bind_addr, "API server listening");
    tracing::info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown completed");
    Ok(())
}
