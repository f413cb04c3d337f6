use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::registry::repository::GameRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub game_repository: Arc<dyn GameRepository + Send + Sync>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(game_repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        Self {
            game_repository,
            started_at: Instant::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Game is full ({player_count}/{max_players})")]
    GameFull { player_count: i32, max_players: i32 },

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            // Full games report the occupancy so clients can decide to wait or move on
            AppError::GameFull {
                player_count,
                max_players,
            } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Game is full",
                    "playerCount": player_count,
                    "maxPlayers": max_players,
                }),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
