//! Common normalized output shape shared by every provider adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One side's identity in a game-list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub first_name: String,
    pub last_name: String,
    /// Display name, surname first.
    pub name: String,
    pub rank: Option<String>,
    /// Name plus rank, ready for display.
    pub display_text: String,
}

impl PlayerIdentity {
    /// Build the identity from a surname/given-name/rank triple.
    pub fn from_parts(last_name: &str, first_name: &str, rank: Option<&str>) -> Self {
        let name = format!("{} {}", last_name, first_name).trim().to_string();
        let display_text = match rank {
            Some(rank) => format!("{name} {rank}"),
            None => name.clone(),
        };
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            name,
            rank: rank.map(str::to_string),
            display_text,
        }
    }
}

/// Normalized metadata block of a game-list entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    /// `YYYY/MM/DD`, provider wall-clock.
    pub date: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub title: String,
    pub tournament: Option<String>,
    /// Move count; zero when the provider does not publish it.
    pub length: u32,
    pub place: Option<String>,
    pub strategy: Option<String>,
}

/// One game in the normalized list shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameListEntry {
    pub game_id: i64,
    /// Provider-secondary numeric id, where one exists.
    pub secondary_id: Option<i64>,
    /// Provider natural key, where one exists.
    pub key: Option<String>,
    pub black: PlayerIdentity,
    pub white: PlayerIdentity,
    pub metadata: GameMetadata,
}

/// Decoded provider list. `count` equals `games.len()` by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfoList {
    pub games: Vec<GameListEntry>,
    pub count: usize,
}
