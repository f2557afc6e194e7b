//! The record document handed to the external importer: CSA move text plus
//! the standard-metadata key/value overlay applied after import.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::bundle::GameBundle;
use crate::csa;
use crate::error::Result;
use crate::message::{jst, GameInfo, PlayerInfo};
use crate::tournament;

/// Standard metadata keys understood by the external record importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    Title,
    Date,
    StartDatetime,
    EndDatetime,
    TimeLimit,
    BlackTimeLimit,
    WhiteTimeLimit,
    Length,
    Tournament,
    Place,
    Strategy,
    BlackName,
    WhiteName,
    Byoyomi,
    Note,
}

impl MetadataKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::Title => "title",
            MetadataKey::Date => "date",
            MetadataKey::StartDatetime => "start_datetime",
            MetadataKey::EndDatetime => "end_datetime",
            MetadataKey::TimeLimit => "time_limit",
            MetadataKey::BlackTimeLimit => "black_time_limit",
            MetadataKey::WhiteTimeLimit => "white_time_limit",
            MetadataKey::Length => "length",
            MetadataKey::Tournament => "tournament",
            MetadataKey::Place => "place",
            MetadataKey::Strategy => "strategy",
            MetadataKey::BlackName => "black_name",
            MetadataKey::WhiteName => "white_name",
            MetadataKey::Byoyomi => "byoyomi",
            MetadataKey::Note => "note",
        }
    }
}

/// Portable move notation plus the ordered metadata overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDocument {
    pub csa: String,
    pub metadata: Vec<(MetadataKey, String)>,
}

/// The providers' fixed +09:00 offset.
pub fn jst_offset() -> FixedOffset {
    jst()
}

/// `YYYY/MM/DD` in JST, the importer's date convention.
pub fn format_date(t: &DateTime<Utc>) -> String {
    t.with_timezone(&jst()).format("%Y/%m/%d").to_string()
}

/// `YYYY/MM/DD HH:mm:ss` in JST.
pub fn format_datetime(t: &DateTime<Utc>) -> String {
    t.with_timezone(&jst()).format("%Y/%m/%d %H:%M:%S").to_string()
}

/// Overlay entries for a game-info frame, in the importer's expected order.
/// Tournament, end time, place and strategy are emitted only when present.
pub fn game_info_metadata(info: &GameInfo) -> Vec<(MetadataKey, String)> {
    let mut entries = vec![
        (MetadataKey::Title, info.title.clone()),
        (MetadataKey::Date, format_date(&info.start_time)),
        (MetadataKey::StartDatetime, format_datetime(&info.start_time)),
        (MetadataKey::TimeLimit, info.time_limit.to_string()),
        (MetadataKey::BlackTimeLimit, info.time_limit.to_string()),
        (MetadataKey::WhiteTimeLimit, info.time_limit.to_string()),
        (MetadataKey::Length, info.moves.to_string()),
    ];
    if let Some(tournament) = tournament::resolve(&info.title) {
        entries.push((MetadataKey::Tournament, tournament.to_string()));
    }
    if let Some(end) = &info.end_time {
        entries.push((MetadataKey::EndDatetime, format_datetime(end)));
    }
    if let Some(location) = &info.location {
        entries.push((MetadataKey::Place, location.clone()));
    }
    if let Some(opening) = &info.opening {
        entries.push((MetadataKey::Strategy, opening.clone()));
    }
    entries
}

/// Overlay entry for a player frame, keyed by its side flag.
pub fn player_info_metadata(player: &PlayerInfo) -> (MetadataKey, String) {
    let key = if player.is_black {
        MetadataKey::BlackName
    } else {
        MetadataKey::WhiteName
    };
    (key, player.name())
}

/// Build the record document for a decoded bundle.
pub fn export_record(bundle: &GameBundle) -> Result<RecordDocument> {
    let csa = csa::events_to_csa(&bundle.events)?;
    let mut metadata = game_info_metadata(&bundle.info);
    metadata.push(player_info_metadata(&bundle.black));
    metadata.push(player_info_metadata(&bundle.white));
    Ok(RecordDocument { csa, metadata })
}
