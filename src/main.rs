use matchmaker::{
    build_router,
    registry::start_cleanup_task,
    AppConfig, AppState, GameRepository, InMemoryGameRepository,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matchmaker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config =
        AppConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    // State lives for the whole process and is dropped on shutdown
    let game_repository: Arc<dyn GameRepository + Send + Sync> =
        Arc::new(InMemoryGameRepository::new());
    let app_state = AppState::new(Arc::clone(&game_repository));

    let cleanup_handle = tokio::spawn(start_cleanup_task(
        game_repository,
        config.cleanup.clone(),
    ));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!(
        port = config.port,
        mode = "registry-only (P2P gameplay)",
        "Matchmaking registry listening on http://{}",
        config.listen_addr()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup_handle.abort();
    info!("Matchmaking registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
