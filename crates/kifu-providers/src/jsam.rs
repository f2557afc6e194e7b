//! Binary-frame provider: the mobile game service's list and detail
//! payloads, built directly on the core assemblers.

use kifu_core::record::format_date;
use kifu_core::{
    assemble_bundle, decode_game_list, export_record, GameSummary, RecordDocument, Result,
    SummaryPlayer,
};

use crate::model::{GameInfoList, GameListEntry, GameMetadata, PlayerIdentity};

/// Decode a list payload of back-to-back summary frames into the common
/// list shape. This provider publishes neither a secondary id nor a natural
/// key.
pub fn decode_list(buf: &[u8]) -> Result<GameInfoList> {
    let list = decode_game_list(buf)?;
    let games: Vec<GameListEntry> = list.games.iter().map(entry_from_summary).collect();
    tracing::debug!(count = list.count, "mapped binary provider list");
    Ok(GameInfoList {
        games,
        count: list.count,
    })
}

/// Decode a detail payload into the CSA document and metadata overlay.
pub fn import_game(buf: &[u8]) -> Result<RecordDocument> {
    let bundle = assemble_bundle(buf)?;
    export_record(&bundle)
}

fn entry_from_summary(summary: &GameSummary) -> GameListEntry {
    GameListEntry {
        game_id: summary.game_id as i64,
        secondary_id: None,
        key: None,
        black: identity(&summary.black),
        white: identity(&summary.white),
        metadata: GameMetadata {
            date: format_date(&summary.start_time),
            start_time: summary.start_time,
            end_time: summary.end_time,
            title: summary.title.clone(),
            tournament: summary.tournament().map(str::to_string),
            length: summary.moves as u32,
            place: None,
            strategy: None,
        },
    }
}

fn identity(player: &SummaryPlayer) -> PlayerIdentity {
    let rank = (!player.rank.is_empty()).then_some(player.rank.as_str());
    PlayerIdentity::from_parts(&player.last_name, &player.first_name, rank)
}
