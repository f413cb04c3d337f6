use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use std::sync::Arc;

use crate::registry::service::RegistryService;
use crate::shared::{AppError, AppState};

/// Liveness view of the process
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub active_games: usize,
    /// Seconds since the registry was constructed
    pub uptime: f64,
}

/// GET /health
#[instrument(name = "health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let service = RegistryService::new(Arc::clone(&state.game_repository));
    let active_games = service.active_game_count().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        active_games,
        uptime: state.started_at.elapsed().as_secs_f64(),
    }))
}
