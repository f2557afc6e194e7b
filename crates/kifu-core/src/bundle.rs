//! Assembly of one game's detail buffer into a bundle of decoded frames.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::message::{
    decode_game_info, decode_move_event, decode_player_info, read_u32_be, GameInfo, MoveEvent,
    PlayerInfo, MOVE_EVENT_MAGIC, PLAYER_INFO_MAGIC,
};
use crate::scan::{find_magic, scan_magic};

/// One game's decoded frames: info, both players, and the ordered move run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBundle {
    pub info: GameInfo,
    pub black: PlayerInfo,
    pub white: PlayerInfo,
    pub events: Vec<MoveEvent>,
}

/// Assemble a detail buffer: the first player-info frame is black, the next
/// is white, and every move-event frame after the white frame joins the
/// ordered run. The game-info decoder locates its own frame in the leading
/// bytes. An empty move run is a semantic error, never an empty bundle.
pub fn assemble_bundle(buf: &[u8]) -> Result<GameBundle> {
    let black_at =
        find_magic(buf, PLAYER_INFO_MAGIC).ok_or(DecodeError::MagicNotFound(PLAYER_INFO_MAGIC))?;
    let white_at = black_at
        + 2
        + find_magic(&buf[black_at + 2..], PLAYER_INFO_MAGIC)
            .ok_or(DecodeError::MagicNotFound(PLAYER_INFO_MAGIC))?;
    tracing::debug!(black_at, white_at, len = buf.len(), "assembling game bundle");

    let info = decode_game_info(buf)?;
    let black = decode_player_info(&buf[black_at..])?;
    let white = decode_player_info(&buf[white_at..])?;

    let tail = &buf[white_at..];
    let mut events = Vec::new();
    for index in scan_magic(tail, MOVE_EVENT_MAGIC) {
        if index + 6 > tail.len() {
            break;
        }
        // Each move frame carries its own length; the slice is clamped to
        // the buffer like the feeds themselves occasionally are.
        let declared = read_u32_be(tail, index + 2)? as usize;
        let end = (index + declared).min(tail.len());
        events.push(decode_move_event(&tail[index..end])?);
    }
    if events.is_empty() {
        return Err(DecodeError::NoMoves);
    }
    tracing::debug!(events = events.len(), "assembled game bundle");
    Ok(GameBundle {
        info,
        black,
        white,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn game_info_frame(game_id: u32, title: &str) -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(b"KI");
        f.extend_from_slice(&[0, 0]);
        f.extend_from_slice(&0u16.to_be_bytes());
        f.extend_from_slice(&game_id.to_be_bytes());
        f.extend_from_slice(b"202507201000");
        f.extend_from_slice(b"000000000000");
        f.push(title.len() as u8);
        f.extend_from_slice(title.as_bytes());
        f.push(0); // opening length
        f.extend_from_slice(&[0, 0]);
        f.extend_from_slice(&60u16.to_be_bytes());
        f.push(0); // location length
        f.extend_from_slice(&95u32.to_be_bytes());
        f.extend_from_slice(&[0, 0, 0]);
        f
    }

    fn player_info_frame(is_black: bool, last: &str, first: &str) -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(b"BI");
        f.extend_from_slice(&[0, 0]);
        f.extend_from_slice(&0u16.to_be_bytes());
        f.push(if is_black { 1 } else { 0 });
        f.push(last.len() as u8);
        f.extend_from_slice(last.as_bytes());
        f.push(first.len() as u8);
        f.extend_from_slice(first.as_bytes());
        f.extend_from_slice(&[0, 0]);
        f
    }

    fn move_event_frame(moves: u16, piece: u8, prev: u8, next: u8, comment: &str) -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(b"KC");
        f.extend_from_slice(&[0, 0, 0, 0]); // total length patched below
        f.extend_from_slice(&moves.to_be_bytes());
        f.push(piece);
        f.push(prev);
        f.push(next);
        f.extend_from_slice(&5u32.to_be_bytes()); // consumed time
        f.extend_from_slice(&[0, 0]);
        f.extend_from_slice(&(comment.len() as u16).to_be_bytes());
        f.extend_from_slice(comment.as_bytes());
        let total = f.len() as u32;
        f[2..6].copy_from_slice(&total.to_be_bytes());
        f
    }

    fn detail_buffer(events: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = game_info_frame(798, "TITLE");
        buf.extend_from_slice(&player_info_frame(true, "SATO", "AMAHIKO"));
        buf.extend_from_slice(&player_info_frame(false, "HABU", "YOSHIHARU"));
        for event in events {
            buf.extend_from_slice(event);
        }
        buf
    }

    #[test]
    fn test_assemble_full_bundle() {
        let buf = detail_buffer(&[
            move_event_frame(0, 0, 0, 0, ""),
            move_event_frame(1, 1, 77, 76, ""),
            move_event_frame(2, 1, 33, 34, "countermove"),
        ]);
        let bundle = assemble_bundle(&buf).unwrap();
        assert_eq!(bundle.info.game_id, 798);
        assert!(bundle.black.is_black);
        assert!(!bundle.white.is_black);
        assert_eq!(bundle.black.last_name, "SATO");
        assert_eq!(bundle.white.last_name, "HABU");
        assert_eq!(bundle.events.len(), 3);
        assert_eq!(bundle.events[2].comment, "countermove");
    }

    #[test]
    fn test_empty_move_run_is_semantic_error() {
        let buf = detail_buffer(&[]);
        let err = assemble_bundle(&buf).unwrap_err();
        assert!(matches!(err, DecodeError::NoMoves));
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_missing_player_frame_is_structural() {
        let buf = game_info_frame(798, "TITLE");
        let err = assemble_bundle(&buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}
