use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    code::is_generated_format,
    models::{normalize_code, GameRecord, MAX_PLAYERS},
    repository::{GameRepository, JoinGameResult, LeaveGameResult},
    types::{
        GameDetails, GameSummary, JoinGameResponse, LeaveGameResponse, RegisterGameRequest,
        RegisterGameResponse,
    },
};
use crate::shared::AppError;

const REGISTER_FIELDS_REQUIRED: &str = "gameCode, hostId, address, and port required";
const GAME_NOT_FOUND: &str = "Game not found";

/// Service for the game lifecycle and read-only queries over the registry
pub struct RegistryService {
    repository: Arc<dyn GameRepository + Send + Sync>,
}

impl RegistryService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Registers a game for a host. An existing game under the same code is overwritten.
    #[instrument(skip(self))]
    pub async fn register_game(
        &self,
        request: RegisterGameRequest,
    ) -> Result<RegisterGameResponse, AppError> {
        let (game_code, host_id, address, port) = match request {
            RegisterGameRequest {
                game_code: Some(game_code),
                host_id: Some(host_id),
                address: Some(address),
                port: Some(port),
            } if !game_code.is_empty()
                && !host_id.is_empty()
                && !address.is_empty()
                && port != 0 =>
            {
                (game_code, host_id, address, port)
            }
            _ => return Err(AppError::Validation(REGISTER_FIELDS_REQUIRED.to_string())),
        };

        if !is_generated_format(&normalize_code(&game_code)) {
            debug!(game_code = %game_code, "Caller supplied a code outside the generated format");
        }

        let game = GameRecord::new(&game_code, host_id, address, port);

        if let Some(previous) = self.repository.put(&game).await? {
            warn!(
                game_code = %game.code,
                previous_session_id = %previous.session_id,
                previous_host_id = %previous.host_id,
                "Registration overwrote an existing game"
            );
        }

        info!(
            game_code = %game.code,
            host_id = %game.host_id,
            connection = %game.connection_string(),
            player_count = game.player_count,
            max_players = MAX_PLAYERS,
            "Game registered"
        );

        Ok(RegisterGameResponse {
            success: true,
            game_code: game.code,
            session_id: game.session_id,
        })
    }

    /// Lists games that still have an open slot
    #[instrument(skip(self))]
    pub async fn list_open_games(&self) -> Result<Vec<GameSummary>, AppError> {
        let games = self.repository.all().await?;
        let total = games.len();

        let mut open: Vec<GameRecord> = games.into_iter().filter(|g| !g.is_full()).collect();
        open.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.code.cmp(&b.code)));

        info!(
            open_games = open.len(),
            total_games = total,
            "Listed available games"
        );

        Ok(open.into_iter().map(to_summary).collect())
    }

    /// Looks up a game by code, full or not
    #[instrument(skip(self))]
    pub async fn get_game(&self, code: &str) -> Result<GameDetails, AppError> {
        let game = self
            .repository
            .get(code)
            .await?
            .ok_or_else(|| AppError::NotFound(GAME_NOT_FOUND.to_string()))?;

        Ok(to_details(game))
    }

    /// Claims a slot in a game
    #[instrument(skip(self))]
    pub async fn join_game(&self, code: &str) -> Result<JoinGameResponse, AppError> {
        match self.repository.try_join(code, MAX_PLAYERS).await? {
            JoinGameResult::Joined(game) => {
                info!(
                    game_code = %game.code,
                    player_count = game.player_count,
                    max_players = MAX_PLAYERS,
                    "Player joined game"
                );
                Ok(JoinGameResponse {
                    success: true,
                    player_count: game.player_count,
                    max_players: MAX_PLAYERS,
                    is_full: game.is_full(),
                })
            }
            JoinGameResult::GameFull(game) => {
                info!(game_code = %game.code, "Join rejected, game is full");
                Err(AppError::GameFull {
                    player_count: game.player_count,
                    max_players: MAX_PLAYERS,
                })
            }
            JoinGameResult::NotFound => Err(AppError::NotFound(GAME_NOT_FOUND.to_string())),
        }
    }

    /// Releases a slot in a game; the game is removed when nobody is left
    #[instrument(skip(self))]
    pub async fn leave_game(&self, code: &str) -> Result<LeaveGameResponse, AppError> {
        match self.repository.leave(code).await? {
            LeaveGameResult::Left(game) => {
                info!(
                    game_code = %game.code,
                    player_count = game.player_count,
                    max_players = MAX_PLAYERS,
                    "Player left game"
                );
                Ok(LeaveGameResponse::Left {
                    success: true,
                    player_count: game.player_count,
                    max_players: MAX_PLAYERS,
                })
            }
            LeaveGameResult::Removed => {
                info!(game_code = %code, "Game removed (no players)");
                Ok(LeaveGameResponse::Removed {
                    success: true,
                    removed: true,
                })
            }
            LeaveGameResult::NotFound => Err(AppError::NotFound(GAME_NOT_FOUND.to_string())),
        }
    }

    /// Removes a game regardless of how many players are in it
    #[instrument(skip(self))]
    pub async fn unregister_game(&self, code: &str) -> Result<(), AppError> {
        if !self.repository.delete(code).await? {
            return Err(AppError::NotFound(GAME_NOT_FOUND.to_string()));
        }

        info!(game_code = %normalize_code(code), "Game unregistered");
        Ok(())
    }

    /// Number of live games, full or not
    pub async fn active_game_count(&self) -> Result<usize, AppError> {
        self.repository.count().await
    }
}

fn to_summary(game: GameRecord) -> GameSummary {
    GameSummary {
        game_code: game.code,
        session_id: game.session_id,
        host_id: game.host_id,
        address: game.address,
        port: game.port,
        player_count: game.player_count,
        max_players: MAX_PLAYERS,
        created_at: game.created_at,
    }
}

fn to_details(game: GameRecord) -> GameDetails {
    let connection_string = game.connection_string();
    GameDetails {
        game_code: game.code,
        session_id: game.session_id,
        host_id: game.host_id,
        address: game.address,
        port: game.port,
        player_count: game.player_count,
        max_players: MAX_PLAYERS,
        created_at: game.created_at,
        connection_string,
    }
}
