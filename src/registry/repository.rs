use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, instrument};

use super::models::{normalize_code, GameRecord};
use crate::shared::AppError;

/// Result of attempting to join a game
#[derive(Debug, Clone)]
pub enum JoinGameResult {
    /// Player slot claimed, returns updated game data
    Joined(GameRecord),
    /// Game is at capacity, returns the untouched game data
    GameFull(GameRecord),
    /// Game does not exist
    NotFound,
}

/// Result of attempting to leave a game
#[derive(Debug, Clone)]
pub enum LeaveGameResult {
    /// Player count decremented, returns updated game data
    Left(GameRecord),
    /// Game was deleted because no players are left
    Removed,
    /// Game does not exist
    NotFound,
}

/// Trait for game store operations
///
/// Codes are normalized to uppercase by every implementation, so lookups
/// are case-insensitive.
#[async_trait]
pub trait GameRepository {
    /// Inserts or overwrites the record under its code, returning any record it replaced
    async fn put(&self, game: &GameRecord) -> Result<Option<GameRecord>, AppError>;
    async fn get(&self, code: &str) -> Result<Option<GameRecord>, AppError>;
    async fn delete(&self, code: &str) -> Result<bool, AppError>;
    async fn all(&self) -> Result<Vec<GameRecord>, AppError>;
    async fn count(&self) -> Result<usize, AppError>;

    /// Atomically checks capacity and increments the player count
    async fn try_join(&self, code: &str, max_players: i32) -> Result<JoinGameResult, AppError>;

    /// Atomically decrements the player count, deleting the game once it reaches zero
    async fn leave(&self, code: &str) -> Result<LeaveGameResult, AppError>;

    /// Deletes every game older than `max_age` at `now`, returning the removed codes
    async fn remove_expired(
        &self,
        max_age: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError>;
}

/// In-memory implementation of GameRepository
///
/// A single mutex guards the whole map: every mutation, including the
/// expiration sweep, is serialized and reads see a consistent snapshot.
/// Data is lost when the process exits.
pub struct InMemoryGameRepository {
    games: Mutex<HashMap<String, GameRecord>>,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated games
    pub fn with_games(games: Vec<GameRecord>) -> Self {
        let game_map = games
            .into_iter()
            .map(|mut game| {
                game.code = normalize_code(&game.code);
                (game.code.clone(), game)
            })
            .collect();

        Self {
            games: Mutex::new(game_map),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, GameRecord>>, AppError> {
        self.games.lock().map_err(|_| {
            error!("Game store mutex poisoned");
            AppError::Internal
        })
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self, game), fields(game_code = %game.code))]
    async fn put(&self, game: &GameRecord) -> Result<Option<GameRecord>, AppError> {
        let code = normalize_code(&game.code);
        let mut stored = game.clone();
        stored.code = code.clone();

        let previous = self.lock()?.insert(code, stored);
        debug!(replaced = previous.is_some(), "Game stored in memory");
        Ok(previous)
    }

    #[instrument(skip(self))]
    async fn get(&self, code: &str) -> Result<Option<GameRecord>, AppError> {
        let game = self.lock()?.get(&normalize_code(code)).cloned();

        match &game {
            Some(g) => debug!(game_code = %g.code, player_count = g.player_count, "Game found"),
            None => debug!(game_code = %code, "Game not found"),
        }

        Ok(game)
    }

    #[instrument(skip(self))]
    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let existed = self.lock()?.remove(&normalize_code(code)).is_some();
        debug!(game_code = %code, existed, "Delete game from memory");
        Ok(existed)
    }

    #[instrument(skip(self))]
    async fn all(&self) -> Result<Vec<GameRecord>, AppError> {
        let games: Vec<GameRecord> = self.lock()?.values().cloned().collect();
        debug!(game_count = games.len(), "Snapshot of all games taken");
        Ok(games)
    }

    async fn count(&self) -> Result<usize, AppError> {
        Ok(self.lock()?.len())
    }

    #[instrument(skip(self))]
    async fn try_join(&self, code: &str, max_players: i32) -> Result<JoinGameResult, AppError> {
        let mut games = self.lock()?;

        let game = match games.get_mut(&normalize_code(code)) {
            Some(game) => game,
            None => {
                debug!(game_code = %code, "Game not found");
                return Ok(JoinGameResult::NotFound);
            }
        };

        if game.player_count >= max_players {
            debug!(game_code = %game.code, player_count = game.player_count, "Game is full");
            return Ok(JoinGameResult::GameFull(game.clone()));
        }

        game.player_count += 1;

        info!(
            game_code = %game.code,
            player_count = game.player_count,
            max_players,
            "Player joined game (atomic)"
        );

        Ok(JoinGameResult::Joined(game.clone()))
    }

    #[instrument(skip(self))]
    async fn leave(&self, code: &str) -> Result<LeaveGameResult, AppError> {
        let code = normalize_code(code);
        let mut games = self.lock()?;

        let game = match games.get_mut(&code) {
            Some(game) => game,
            None => {
                debug!(game_code = %code, "Game not found");
                return Ok(LeaveGameResult::NotFound);
            }
        };

        // No floor: leaving at a count of 1 empties and removes the game
        game.player_count -= 1;

        if game.player_count <= 0 {
            games.remove(&code);
            info!(game_code = %code, "Game is now empty, deleting");
            return Ok(LeaveGameResult::Removed);
        }

        info!(
            game_code = %code,
            player_count = game.player_count,
            "Player left game (atomic)"
        );

        Ok(LeaveGameResult::Left(game.clone()))
    }

    #[instrument(skip(self))]
    async fn remove_expired(
        &self,
        max_age: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        let mut games = self.lock()?;

        let expired: Vec<String> = games
            .iter()
            .filter(|(_, game)| game.is_expired(now, max_age))
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            games.remove(code);
        }

        debug!(
            removed = expired.len(),
            remaining = games.len(),
            "Expired games removed"
        );
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::models::MAX_PLAYERS;
    use chrono::Duration;

    /// Test helper functions for creating test data
    mod helpers {
        use super::*;

        /// Creates a test game with a specific code and player count
        pub fn create_test_game(code: &str, player_count: i32) -> GameRecord {
            let mut game = GameRecord::new(code, "test-host".into(), "10.0.0.1".into(), 7777);
            game.player_count = player_count;
            game
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_put_and_get_game() {
        let repo = InMemoryGameRepository::new();
        let game = create_test_game("ABC234", 1);

        let previous = repo.put(&game).await.unwrap();
        assert!(previous.is_none());

        let retrieved = repo.get("ABC234").await.unwrap().unwrap();
        assert_eq!(retrieved, game);
    }

    #[tokio::test]
    async fn test_get_is_case_insensitive() {
        let repo = InMemoryGameRepository::new();
        repo.put(&create_test_game("xyz789", 1)).await.unwrap();

        let retrieved = repo.get("xYz789").await.unwrap().unwrap();
        assert_eq!(retrieved.code, "XYZ789");
    }

    #[tokio::test]
    async fn test_put_stores_under_uppercase_code() {
        let repo = InMemoryGameRepository::new();
        let mut game = create_test_game("ABC234", 1);
        game.code = "abc234".to_string();

        repo.put(&game).await.unwrap();

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].code, "ABC234");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_code() {
        let repo = InMemoryGameRepository::new();
        let first = create_test_game("DUP234", 3);
        let second = create_test_game("DUP234", 1);

        repo.put(&first).await.unwrap();
        let previous = repo.put(&second).await.unwrap();

        assert_eq!(previous, Some(first));
        let stored = repo.get("DUP234").await.unwrap().unwrap();
        assert_eq!(stored.session_id, second.session_id);
        assert_eq!(stored.player_count, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent_game() {
        let repo = InMemoryGameRepository::new();

        assert!(repo.get("NOPE22").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_game() {
        let repo = InMemoryGameRepository::new();
        repo.put(&create_test_game("DEL234", 2)).await.unwrap();

        assert!(repo.delete("del234").await.unwrap());
        assert!(!repo.delete("DEL234").await.unwrap());
        assert!(repo.get("DEL234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_all_and_count() {
        let repo = InMemoryGameRepository::with_games(vec![
            create_test_game("AAA222", 1),
            create_test_game("BBB333", 2),
            create_test_game("CCC444", 4),
        ]);

        assert_eq!(repo.count().await.unwrap(), 3);

        let codes: std::collections::HashSet<String> = repo
            .all()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.code)
            .collect();
        assert!(codes.contains("AAA222"));
        assert!(codes.contains("BBB333"));
        assert!(codes.contains("CCC444"));
    }

    #[tokio::test]
    async fn test_try_join_increments_until_full() {
        let repo = InMemoryGameRepository::new();
        repo.put(&create_test_game("JON234", 1)).await.unwrap();

        for expected in 2..=MAX_PLAYERS {
            match repo.try_join("JON234", MAX_PLAYERS).await.unwrap() {
                JoinGameResult::Joined(game) => assert_eq!(game.player_count, expected),
                other => panic!("expected join to succeed, got {other:?}"),
            }
        }

        match repo.try_join("JON234", MAX_PLAYERS).await.unwrap() {
            JoinGameResult::GameFull(game) => assert_eq!(game.player_count, MAX_PLAYERS),
            other => panic!("expected full game, got {other:?}"),
        }

        let stored = repo.get("JON234").await.unwrap().unwrap();
        assert_eq!(stored.player_count, MAX_PLAYERS);
    }

    #[tokio::test]
    async fn test_try_join_missing_game() {
        let repo = InMemoryGameRepository::new();

        let result = repo.try_join("MISS22", MAX_PLAYERS).await.unwrap();
        assert!(matches!(result, JoinGameResult::NotFound));
    }

    #[tokio::test]
    async fn test_leave_decrements() {
        let repo = InMemoryGameRepository::new();
        repo.put(&create_test_game("LEV234", 3)).await.unwrap();

        match repo.leave("lev234").await.unwrap() {
            LeaveGameResult::Left(game) => assert_eq!(game.player_count, 2),
            other => panic!("expected leave, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_leave_last_player_removes_game() {
        let repo = InMemoryGameRepository::new();
        repo.put(&create_test_game("LST234", 1)).await.unwrap();

        let result = repo.leave("LST234").await.unwrap();
        assert!(matches!(result, LeaveGameResult::Removed));
        assert!(repo.get("LST234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_leave_missing_game() {
        let repo = InMemoryGameRepository::new();

        let result = repo.leave("MISS22").await.unwrap();
        assert!(matches!(result, LeaveGameResult::NotFound));
    }

    #[tokio::test]
    async fn test_remove_expired_ignores_player_count() {
        let now = Utc::now();
        let mut old_full = create_test_game("OLD234", MAX_PLAYERS);
        old_full.created_at = now - Duration::minutes(61);
        let mut old_single = create_test_game("OLD567", 1);
        old_single.created_at = now - Duration::minutes(90);
        let mut boundary = create_test_game("EDG234", 2);
        boundary.created_at = now - Duration::minutes(60);
        let fresh = create_test_game("NEW234", 2);

        let repo = InMemoryGameRepository::with_games(vec![old_full, old_single, boundary, fresh]);

        let mut removed = repo
            .remove_expired(Duration::minutes(60), now)
            .await
            .unwrap();
        removed.sort();

        assert_eq!(removed, vec!["OLD234".to_string(), "OLD567".to_string()]);
        assert!(repo.get("EDG234").await.unwrap().is_some());
        assert!(repo.get("NEW234").await.unwrap().is_some());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_with_games_normalizes_codes_before_expiry() {
        let now = Utc::now();
        let mut stale = create_test_game("ABC234", 2);
        stale.code = "abc234".to_string();
        stale.created_at = now - Duration::minutes(61);

        let repo = InMemoryGameRepository::with_games(vec![stale]);
        assert_eq!(repo.get("ABC234").await.unwrap().unwrap().code, "ABC234");

        let removed = repo
            .remove_expired(Duration::minutes(60), now)
            .await
            .unwrap();

        assert_eq!(removed, vec!["ABC234".to_string()]);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_never_exceed_capacity() {
        let repo = std::sync::Arc::new(InMemoryGameRepository::new());
        repo.put(&create_test_game("RCE234", 1)).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.try_join("RCE234", MAX_PLAYERS).await.unwrap() })
            })
            .collect();

        let mut joined = 0;
        for handle in handles {
            if let JoinGameResult::Joined(_) = handle.await.unwrap() {
                joined += 1;
            }
        }

        assert_eq!(joined, MAX_PLAYERS - 1);
        let stored = repo.get("RCE234").await.unwrap().unwrap();
        assert_eq!(stored.player_count, MAX_PLAYERS);
    }
}
