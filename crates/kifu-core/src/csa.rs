//! Translation of decoded move events into CSA move-record lines.
//!
//! The output is plain line-oriented text for the external record importer;
//! that library owns legality and move-tree construction.

use crate::error::{DecodeError, Result};
use crate::message::MoveEvent;

/// CSA piece codes indexed by wire piece id. Ids 9..=15 are the promoted
/// forms, reached by adding 8 to the base id when the destination byte
/// carried the promotion flag. Gold and king have no promoted form.
const PIECE_CODES: [&str; 16] = [
    "", "FU", "KY", "KE", "GI", "KI", "KA", "HI", "OU", "TO", "NY", "NK", "NG", "", "UM", "RY",
];

/// CSA code for a wire piece id.
pub fn piece_code(piece: u8) -> Result<&'static str> {
    match PIECE_CODES.get(piece as usize) {
        Some(code) if !code.is_empty() => Ok(code),
        _ => Err(DecodeError::Schema(format!("unknown piece id {piece}"))),
    }
}

/// CSA lines for one move event.
///
/// A zero move counter is the initial-position record and emits only the
/// `PI`/`+` sentinel. A zero piece id is resignation. Everything else is a
/// regular move: side prefix from move parity, zero-padded coordinates,
/// piece code, then the consumed-time line. Non-empty comment lines follow
/// as `'*` annotation lines in all but the initial-position case.
pub fn event_to_csa(event: &MoveEvent) -> Result<String> {
    if event.moves == 0 {
        return Ok("PI\n+".to_string());
    }
    let mut lines: Vec<String> = Vec::new();
    if event.piece == 0 {
        lines.push("%TORYO".to_string());
    } else {
        let prefix = if event.moves & 1 == 1 { '+' } else { '-' };
        lines.push(format!(
            "{}{:02}{:02}{}",
            prefix,
            event.prev,
            event.next,
            piece_code(event.piece)?
        ));
        lines.push(format!("T{}", event.consumed_time));
    }
    for line in event.comment.lines().filter(|line| !line.is_empty()) {
        lines.push(format!("'*{line}"));
    }
    Ok(lines.join("\n"))
}

/// Join a game's events into the CSA document handed to the importer.
pub fn events_to_csa(events: &[MoveEvent]) -> Result<String> {
    let parts: Vec<String> = events.iter().map(event_to_csa).collect::<Result<_>>()?;
    Ok(parts.join("\n"))
}
