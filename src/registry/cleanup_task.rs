use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{error, info, instrument};

use super::repository::GameRepository;
use crate::shared::AppError;

/// Configuration for the expiration sweep
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the sweep
    pub cleanup_interval: Duration,
    /// How long a game may live before it is evicted, whatever its occupancy
    pub max_game_age: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10 * 60), // 10 minutes
            max_game_age: Duration::from_secs(60 * 60),     // 60 minutes
        }
    }
}

/// Starts the background sweep that periodically evicts games past their maximum age
///
/// The first sweep runs one interval after start.
#[instrument(skip(game_repository))]
pub async fn start_cleanup_task(
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    config: CleanupConfig,
) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        max_game_age_secs = config.max_game_age.as_secs(),
        "Starting game cleanup background task"
    );

    let mut cleanup_interval = interval_at(
        Instant::now() + config.cleanup_interval,
        config.cleanup_interval,
    );

    loop {
        cleanup_interval.tick().await;

        match sweep_expired_games(&game_repository, config.max_game_age).await {
            Ok(removed) => info!(removed, "Game cleanup completed"),
            Err(e) => error!(error = %e, "Game cleanup task failed"),
        }
    }
}

/// Evicts every game older than `max_game_age`, returning how many were removed
#[instrument(skip(game_repository))]
pub async fn sweep_expired_games(
    game_repository: &Arc<dyn GameRepository + Send + Sync>,
    max_game_age: Duration,
) -> Result<usize, AppError> {
    let max_age = chrono::Duration::from_std(max_game_age).map_err(|_| AppError::Internal)?;
    let removed = game_repository.remove_expired(max_age, Utc::now()).await?;

    for game_code in &removed {
        info!(game_code = %game_code, "Removed stale game");
    }

    Ok(removed.len())
}
