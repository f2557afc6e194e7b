//! Game-list assembly over back-to-back summary frames.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{decode_game_summary, read_u32_be, GameSummary, GAME_INFO_MAGIC};
use crate::scan::scan_magic;

/// Bytes preceding a frame's payload: magic(2) + separator(2) + length(2).
/// The declared length is read as a 32-bit word spanning the separator and
/// length fields.
pub const FRAME_HEADER_LEN: usize = 6;

/// Decoded list payload. `count` equals `games.len()` by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameList {
    pub games: Vec<GameSummary>,
    pub count: usize,
}

/// Decode a buffer of back-to-back summary frames.
///
/// Every summary-magic occurrence whose header fits is a candidate; a
/// candidate is accepted only when its whole declared frame is present in
/// the buffer (the unified acceptance policy, see DESIGN.md). Accepted
/// frames decode strictly; a malformed accepted frame fails the call.
pub fn decode_game_list(buf: &[u8]) -> Result<GameList> {
    let mut games = Vec::new();
    for index in scan_magic(buf, GAME_INFO_MAGIC) {
        if index + FRAME_HEADER_LEN >= buf.len() {
            break;
        }
        let declared = read_u32_be(buf, index + 2)? as usize;
        let end = index + declared + FRAME_HEADER_LEN;
        if end > buf.len() {
            tracing::debug!(offset = index, declared, "skipping truncated summary frame");
            continue;
        }
        games.push(decode_game_summary(&buf[index..end])?);
    }
    let count = games.len();
    tracing::debug!(count, "decoded summary list");
    Ok(GameList { games, count })
}
