// Library crate for the matchmaking registry
// This file exposes the public API for integration tests

pub mod config;
pub mod health;
pub mod registry;
pub mod shared;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use registry::{
    models::{GameRecord, MAX_PLAYERS},
    repository::{GameRepository, InMemoryGameRepository},
};
pub use shared::{AppError, AppState};

/// Builds the HTTP router for the registry
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/games/register", post(registry::register_game))
        .route("/api/games/list", get(registry::list_games))
        .route("/api/games/code", get(registry::generate_code))
        .route(
            "/api/games/:game_code",
            get(registry::get_game).delete(registry::unregister_game),
        )
        .route("/api/games/:game_code/join", post(registry::join_game))
        .route("/api/games/:game_code/leave", post(registry::leave_game))
        .route("/health", get(health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
