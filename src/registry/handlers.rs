use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    code::generate_game_code,
    service::RegistryService,
    types::{
        GenerateCodeResponse, GetGameResponse, JoinGameResponse, LeaveGameResponse,
        ListGamesResponse, RegisterGameRequest, RegisterGameResponse, UnregisterGameResponse,
    },
};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a game
///
/// POST /api/games/register
/// Stores the host's connection info under the uppercased game code
#[instrument(name = "register_game", skip(state, payload))]
pub async fn register_game(
    State(state): State<AppState>,
    payload: Result<Json<RegisterGameRequest>, JsonRejection>,
) -> Result<Json<RegisterGameResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected register payload");
        AppError::Validation(rejection.body_text())
    })?;

    let service = RegistryService::new(Arc::clone(&state.game_repository));
    let response = service.register_game(request).await?;

    Ok(Json(response))
}

/// HTTP handler for listing games with open slots
///
/// GET /api/games/list
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Json<ListGamesResponse>, AppError> {
    let service = RegistryService::new(Arc::clone(&state.game_repository));
    let games = service.list_open_games().await?;

    Ok(Json(ListGamesResponse {
        success: true,
        games,
    }))
}

/// HTTP handler for suggesting a fresh game code
///
/// GET /api/games/code
#[instrument(name = "generate_code")]
pub async fn generate_code() -> Json<GenerateCodeResponse> {
    let game_code = generate_game_code();

    info!(game_code = %game_code, "Generated game code");

    Json(GenerateCodeResponse {
        success: true,
        game_code,
    })
}

/// HTTP handler for looking up a game's connection info
///
/// GET /api/games/:game_code
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_code): Path<String>,
) -> Result<Json<GetGameResponse>, AppError> {
    let service = RegistryService::new(Arc::clone(&state.game_repository));
    let game = service.get_game(&game_code).await?;

    Ok(Json(GetGameResponse {
        success: true,
        game,
    }))
}

/// POST /api/games/:game_code/join
#[instrument(name = "join_game", skip(state))]
pub async fn join_game(
    State(state): State<AppState>,
    Path(game_code): Path<String>,
) -> Result<Json<JoinGameResponse>, AppError> {
    let service = RegistryService::new(Arc::clone(&state.game_repository));
    Ok(Json(service.join_game(&game_code).await?))
}

/// POST /api/games/:game_code/leave
#[instrument(name = "leave_game", skip(state))]
pub async fn leave_game(
    State(state): State<AppState>,
    Path(game_code): Path<String>,
) -> Result<Json<LeaveGameResponse>, AppError> {
    let service = RegistryService::new(Arc::clone(&state.game_repository));
    Ok(Json(service.leave_game(&game_code).await?))
}

/// DELETE /api/games/:game_code
#[instrument(name = "unregister_game", skip(state))]
pub async fn unregister_game(
    State(state): State<AppState>,
    Path(game_code): Path<String>,
) -> Result<Json<UnregisterGameResponse>, AppError> {
    let service = RegistryService::new(Arc::clone(&state.game_repository));
    service.unregister_game(&game_code).await?;

    Ok(Json(UnregisterGameResponse { success: true }))
}
