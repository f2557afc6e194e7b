//! Per-message-type frame decoders for the binary game-record formats.
//!
//! Every frame starts with a 2-byte ASCII magic. Field boundaries are data
//! dependent: single-byte length prefixes embedded in the frame size the
//! variable fields, so each decoder first reads the prefixes at their fixed
//! cumulative offsets, then chunks the frame and interprets the slices.
//! Layouts are fixed per message type and never reordered.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::scan::{chunk, find_magic};
use crate::text;
use crate::tournament;

/// Magic of the game-information frame (also leads a summary frame).
pub const GAME_INFO_MAGIC: [u8; 2] = *b"KI";
/// Magic of the player-information frame.
pub const PLAYER_INFO_MAGIC: [u8; 2] = *b"BI";
/// Magic of the move/comment frame.
pub const MOVE_EVENT_MAGIC: [u8; 2] = *b"KC";

/// Move counter value meaning "game not started yet"; maps to zero for both
/// the move count and the time limit.
const MOVE_COUNT_SENTINEL: u32 = 0x400;

/// End timestamp meaning "still in progress".
const EMPTY_TIMESTAMP: &str = "000000000000";

/// Provider timestamps are JST wall-clock; JST has no DST, so a fixed
/// +09:00 offset is sufficient.
pub(crate) fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("+09:00 is in range")
}

/// Game-information frame: identity, schedule, and framing of one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    /// Declared frame length.
    pub length: u16,
    pub game_id: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub title: String,
    /// Opening / strategy name.
    pub opening: Option<String>,
    pub location: Option<String>,
    pub moves: u32,
    /// Time limit per side, minutes.
    pub time_limit: u16,
}

/// Player-information frame: one side's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub length: u16,
    pub is_black: bool,
    pub last_name: String,
    pub first_name: String,
}

impl PlayerInfo {
    /// Display name, surname first.
    pub fn name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// Move/comment frame: one half-move, or the resignation marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveEvent {
    pub length: u16,
    /// Half-move index; zero marks the initial-position record.
    pub moves: u16,
    /// Seconds consumed on this move.
    pub consumed_time: u32,
    /// Source square, file-rank packed in one decimal byte.
    pub prev: u8,
    /// Destination square; the promotion flag has already been folded out.
    pub next: u8,
    /// Piece id into the CSA piece table; zero marks resignation. Promoted
    /// ids (+8) are applied here when the destination carried the flag.
    pub piece: u8,
    pub comment: String,
}

/// Name and rank sub-record inside a summary frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPlayer {
    pub last_name: String,
    pub first_name: String,
    pub rank: String,
}

/// Summary frame from the list endpoint: game info plus both players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub length: u16,
    pub game_id: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub title: String,
    pub moves: u8,
    pub black: SummaryPlayer,
    pub white: SummaryPlayer,
}

impl GameSummary {
    /// Tournament resolved from the title, if the catalog recognizes it.
    pub fn tournament(&self) -> Option<&'static str> {
        tournament::resolve(&self.title)
    }
}

/// Exhaustive decoded-message union.
///
/// Unknown magics decode to [`DecodedMessage::Unrecognized`] instead of
/// being dropped silently. The summary form shares the game-info magic and
/// is selected by the list assembler, never by tag dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DecodedMessage {
    GameInfo(GameInfo),
    PlayerInfo(PlayerInfo),
    MoveEvent(MoveEvent),
    GameSummary(GameSummary),
    Unrecognized { magic: [u8; 2] },
}

/// Decode the frame a 2-byte magic identifies.
pub fn decode_message(buf: &[u8], magic: [u8; 2]) -> Result<DecodedMessage> {
    match &magic {
        b"KI" => Ok(DecodedMessage::GameInfo(decode_game_info(buf)?)),
        b"BI" => Ok(DecodedMessage::PlayerInfo(decode_player_info(buf)?)),
        b"KC" => Ok(DecodedMessage::MoveEvent(decode_move_event(buf)?)),
        _ => Ok(DecodedMessage::Unrecognized { magic }),
    }
}

/// Decode a game-information frame.
///
/// Layout after the magic: separator(2) length(2) id(4) start(12) end(12),
/// then the length-prefixed title, opening and location runs, the time
/// limit, the 4-byte move counter and a 3-byte trailer.
pub fn decode_game_info(buf: &[u8]) -> Result<GameInfo> {
    let index =
        find_magic(buf, GAME_INFO_MAGIC).ok_or(DecodeError::MagicNotFound(GAME_INFO_MAGIC))?;
    let title_len = read_u8(buf, index + 0x22)? as usize;
    let opening_len = read_u8(buf, index + 0x23 + title_len)? as usize;
    let location_len = read_u8(buf, index + 0x28 + title_len + opening_len)? as usize;
    let widths = [
        2,            // separator
        2,            // declared length
        4,            // game id
        12,           // start timestamp
        12,           // end timestamp
        1,            // title length
        title_len,    // title
        1,            // opening length
        opening_len,  // opening
        1,            // unknown
        1,            // unknown
        2,            // time limit
        1,            // location length
        location_len, // location
        4,            // move counter
        2,            // trailer
        1,            // trailer
    ];
    let fields = chunk(&buf[index + 2..], &widths);

    let moves = field_u32(&fields[14]);
    let info = GameInfo {
        length: field_u16(&fields[1]),
        game_id: field_u32(&fields[2]),
        start_time: parse_timestamp(&fields[3])?,
        end_time: parse_end_timestamp(&fields[4])?,
        title: normalize_title(&text::decode_shift_jis(&fields[6])),
        opening: optional_field(&fields[8]).map(|s| text::to_half_width_digits(&s)),
        location: optional_field(&fields[13]).map(|s| text::normalize_text(&s)),
        moves: if moves == MOVE_COUNT_SENTINEL { 0 } else { moves },
        time_limit: if moves == MOVE_COUNT_SENTINEL {
            0
        } else {
            field_u16(&fields[11])
        },
    };
    if info.title.is_empty() {
        return Err(DecodeError::Schema("game title is empty".into()));
    }
    if info.moves > 512 {
        return Err(DecodeError::Schema(format!(
            "move counter {} out of range",
            info.moves
        )));
    }
    Ok(info)
}

/// Decode a player-information frame.
pub fn decode_player_info(buf: &[u8]) -> Result<PlayerInfo> {
    let index =
        find_magic(buf, PLAYER_INFO_MAGIC).ok_or(DecodeError::MagicNotFound(PLAYER_INFO_MAGIC))?;
    let last_len = read_u8(buf, index + 0x07)? as usize;
    let first_len = read_u8(buf, index + 0x08 + last_len)? as usize;
    let widths = [2, 2, 1, 1, last_len, 1, first_len, 2];
    let fields = chunk(&buf[index + 2..], &widths);

    let info = PlayerInfo {
        length: field_u16(&fields[1]),
        is_black: fields[2][0] == 0x01,
        last_name: text::decode_shift_jis(&fields[4]),
        first_name: text::decode_shift_jis(&fields[6]),
    };
    if info.last_name.is_empty() {
        return Err(DecodeError::Schema("player surname is empty".into()));
    }
    Ok(info)
}

/// Decode a move/comment frame.
///
/// A 14-byte frame is the resignation form: it carries no comment-length
/// field and its consumed time reads as zero. Otherwise the comment length
/// is the 16-bit tail of the 4-byte field at `magic + 0x11`. A destination
/// byte above 0x80 flags promotion: the flag is folded out of the
/// coordinate and 8 is added to the piece id.
pub fn decode_move_event(buf: &[u8]) -> Result<MoveEvent> {
    let index =
        find_magic(buf, MOVE_EVENT_MAGIC).ok_or(DecodeError::MagicNotFound(MOVE_EVENT_MAGIC))?;
    let is_resign = buf.len() == 0x0e;
    let comment_len = if is_resign {
        0
    } else {
        read_u16_be(buf, index + 0x11)? as usize
    };
    let widths = [2, 2, 2, 1, 1, 1, 4, 4, comment_len];
    let fields = chunk(&buf[index + 2..], &widths);

    let piece = fields[3][0];
    let next = fields[5][0];
    // Wrapping keeps a garbage piece byte from panicking; the piece table
    // rejects it later.
    let (next, piece) = if next > 0x80 {
        (next - 0x80, piece.wrapping_add(0x08))
    } else {
        (next, piece)
    };
    Ok(MoveEvent {
        length: field_u16(&fields[1]),
        moves: field_u16(&fields[2]),
        consumed_time: if is_resign { 0 } else { field_u32(&fields[6]) },
        prev: fields[4][0],
        next,
        piece,
        comment: text::normalize_text(&text::decode_shift_jis(&fields[8])),
    })
}

/// Decode a summary frame: the game-info layout with both players' name and
/// rank runs in place of the location tail.
///
/// Each sub-field chain (surname length → surname → given-name length →
/// given name → rank length → rank) resolves sequentially; every offset
/// depends on the cumulative lengths before it.
pub fn decode_game_summary(buf: &[u8]) -> Result<GameSummary> {
    let index =
        find_magic(buf, GAME_INFO_MAGIC).ok_or(DecodeError::MagicNotFound(GAME_INFO_MAGIC))?;
    let title_len = read_u8(buf, index + 0x22)? as usize;
    let opening_len = read_u8(buf, index + 0x23 + title_len)? as usize;

    let black_at = index + 0x28 + title_len + opening_len;
    let black_last_len = read_u8(buf, black_at)? as usize;
    let black_first_len = read_u8(buf, black_at + 0x01 + black_last_len)? as usize;
    let black_rank_len =
        read_u8(buf, black_at + 0x02 + black_last_len + black_first_len)? as usize;

    let white_at = black_at + 0x03 + black_last_len + black_first_len + black_rank_len;
    let white_last_len = read_u8(buf, white_at)? as usize;
    let white_first_len = read_u8(buf, white_at + 0x01 + white_last_len)? as usize;
    let white_rank_len =
        read_u8(buf, white_at + 0x02 + white_last_len + white_first_len)? as usize;

    let widths = [
        2,               // separator
        2,               // declared length
        4,               // game id
        12,              // start timestamp
        12,              // end timestamp
        1,               // title length
        title_len,       // title
        1,               // opening length
        opening_len,     // opening
        1,               // move counter
        1,               // unknown
        2,               // time limit
        1,               // black surname length
        black_last_len,  // black surname
        1,               // black given-name length
        black_first_len, // black given name
        1,               // black rank length
        black_rank_len,  // black rank
        1,               // white surname length
        white_last_len,  // white surname
        1,               // white given-name length
        white_first_len, // white given name
        1,               // white rank length
        white_rank_len,  // white rank
    ];
    let fields = chunk(&buf[index + 2..], &widths);

    let summary = GameSummary {
        length: field_u16(&fields[1]),
        game_id: field_u32(&fields[2]),
        start_time: parse_timestamp(&fields[3])?,
        end_time: parse_end_timestamp(&fields[4])?,
        title: normalize_title(&text::decode_shift_jis(&fields[6])),
        // The list endpoint packs the move count into this single byte; the
        // 4-byte counter of the detail form is absent here.
        moves: fields[9][0],
        black: SummaryPlayer {
            last_name: text::decode_shift_jis(&fields[13]),
            first_name: text::decode_shift_jis(&fields[15]),
            rank: text::decode_shift_jis(&fields[17]),
        },
        white: SummaryPlayer {
            last_name: text::decode_shift_jis(&fields[19]),
            first_name: text::decode_shift_jis(&fields[21]),
            rank: text::decode_shift_jis(&fields[23]),
        },
    };
    if summary.title.is_empty() {
        return Err(DecodeError::Schema("game title is empty".into()));
    }
    if summary.black.last_name.is_empty() || summary.white.last_name.is_empty() {
        return Err(DecodeError::Schema("player surname is empty".into()));
    }
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

pub(crate) fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    buf.get(offset).copied().ok_or(DecodeError::Truncated {
        offset,
        needed: 1,
        available: buf.len(),
    })
}

pub(crate) fn read_u16_be(buf: &[u8], offset: usize) -> Result<u16> {
    match buf.get(offset..offset + 2) {
        Some(bytes) => Ok(u16::from_be_bytes([bytes[0], bytes[1]])),
        None => Err(DecodeError::Truncated {
            offset,
            needed: 2,
            available: buf.len(),
        }),
    }
}

pub(crate) fn read_u32_be(buf: &[u8], offset: usize) -> Result<u32> {
    match buf.get(offset..offset + 4) {
        Some(bytes) => Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        None => Err(DecodeError::Truncated {
            offset,
            needed: 4,
            available: buf.len(),
        }),
    }
}

/// Big-endian u16 from a chunked field (already padded to width).
fn field_u16(field: &[u8]) -> u16 {
    u16::from_be_bytes([field[0], field[1]])
}

/// Big-endian u32 from a chunked field (already padded to width).
fn field_u32(field: &[u8]) -> u32 {
    u32::from_be_bytes([field[0], field[1], field[2], field[3]])
}

/// Zero-length optional text field maps to absent.
fn optional_field(field: &[u8]) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(text::decode_shift_jis(field))
    }
}

/// Titles carry a `/`-separated qualifier; only the leading segment is kept.
fn normalize_title(raw: &str) -> String {
    text::normalize_text(raw)
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 12-byte Shift-JIS digit run `YYYYMMDDHHmm`, JST wall-clock.
fn parse_timestamp(field: &[u8]) -> Result<DateTime<Utc>> {
    let digits = text::decode_shift_jis(field);
    let naive = NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M")
        .map_err(|_| DecodeError::DateFormat(digits.clone()))?;
    jst_to_utc(naive, &digits)
}

/// Like [`parse_timestamp`], with the all-zero sentinel meaning absent.
fn parse_end_timestamp(field: &[u8]) -> Result<Option<DateTime<Utc>>> {
    let digits = text::decode_shift_jis(field);
    if digits == EMPTY_TIMESTAMP {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M")
        .map_err(|_| DecodeError::DateFormat(digits.clone()))?;
    jst_to_utc(naive, &digits).map(Some)
}

fn jst_to_utc(naive: NaiveDateTime, source: &str) -> Result<DateTime<Utc>> {
    naive
        .and_local_timezone(jst())
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| DecodeError::DateFormat(source.to_string()))
}
