use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of players in a game, host included
pub const MAX_PLAYERS: i32 = 4;

/// Canonical form of a game code used as the store key
pub fn normalize_code(code: &str) -> String {
    code.to_uppercase()
}

/// In-memory model for a registered game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub code: String,       // Uppercased join code, unique key in the store
    pub session_id: String, // Display-only identifier, not a credential
    pub host_id: String,
    pub address: String,
    pub port: u16,
    pub player_count: i32, // Host occupies the first slot
    pub created_at: DateTime<Utc>,
}

impl GameRecord {
    /// Creates a freshly registered game with the host as its only player
    pub fn new(code: &str, host_id: String, address: String, port: u16) -> Self {
        Self {
            code: normalize_code(code),
            session_id: format!("game_{}", Uuid::new_v4().simple()),
            host_id,
            address,
            port,
            player_count: 1,
            created_at: Utc::now(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.player_count >= MAX_PLAYERS
    }

    /// `address:port` as handed to peers for the P2P connection
    pub fn connection_string(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// True once the record has lived longer than `max_age`
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now.signed_duration_since(self.created_at) > max_age
    }
}
