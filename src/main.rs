use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobboard_backend::{app_config, build_router, initialize_app_state, services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = app_config::config();

    // Initialize tracing
    if config.features.enable_tracing {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    format!("jobboard_backend={},tower_http=info", config.server.rust_log).into()
                }),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!(
        environment = %config.environment,
        bind_address = %config.server.bind_address,
        "Starting job board API"
    );

    let state = initialize_app_state()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize application state")?;

    if config.features.enable_token_cleanup {
        services::spawn_token_cleanup(
            state.diesel_pool.clone(),
            config.security.token_cleanup_interval_seconds,
        );
    } else {
        warn!("Expired token cleanup is disabled");
    }

    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!("Listening on {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
