use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request payload for registering a game
///
/// Every field is optional at the wire level so a missing field surfaces as a
/// validation error instead of a deserialization rejection.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterGameRequest {
    pub game_code: Option<String>,
    pub host_id: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterGameResponse {
    pub success: bool,
    pub game_code: String,
    pub session_id: String,
}

/// Public view of a game as shown in the listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_code: String,
    pub session_id: String,
    pub host_id: String,
    pub address: String,
    pub port: u16,
    pub player_count: i32,
    pub max_players: i32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Public view of a single game, with the endpoint peers should dial
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    pub game_code: String,
    pub session_id: String,
    pub host_id: String,
    pub address: String,
    pub port: u16,
    pub player_count: i32,
    pub max_players: i32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub connection_string: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesResponse {
    pub success: bool,
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetGameResponse {
    pub success: bool,
    pub game: GameDetails,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    pub success: bool,
    pub game_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameResponse {
    pub success: bool,
    pub player_count: i32,
    pub max_players: i32,
    pub is_full: bool,
}

/// Either the remaining occupancy or a notice that the game was removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeaveGameResponse {
    #[serde(rename_all = "camelCase")]
    Left {
        success: bool,
        player_count: i32,
        max_players: i32,
    },
    Removed { success: bool, removed: bool },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnregisterGameResponse {
    pub success: bool,
}
