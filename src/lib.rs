// Library exports for the job board backend
// The binary and the integration tests both build the router through here

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use db::DieselPool;
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use models::auth::{AccessTokenClaims, RefreshTokenClaims};
pub use services::{EmailService, JwtConfig, JwtError, JwtService};

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Connect the pool, apply migrations and wire services from the global config
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let config = app_config::config();

    info!("Initializing database pool...");
    let diesel_pool = db::create_diesel_pool(db::DieselDatabaseConfig::from(&config.database)).await?;

    if migrations::should_run_migrations(config) {
        info!("Running embedded migrations...");
        migrations::run_migrations(&config.database_url).await?;
    }

    let email_service = EmailService::new(config.email.clone())?;

    Ok(AppState::new(
        Arc::new(config.clone()),
        diesel_pool,
        email_service,
    ))
}

/// Full application router: `/api/*` plus `/health`, with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors_layer(
        &state.config.security.cors_allowed_origins,
        state.config.is_production(),
    );

    Router::new()
        .nest("/api", handlers::api_routes(&state))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Health check handler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (healthy, postgres_health) = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(_) => (
            true,
            serde_json::json!({
                "status": "healthy",
                "max_connections": state.max_connections,
                "error": null
            }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "jobboard-backend",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health
        }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
