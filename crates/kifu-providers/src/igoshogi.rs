//! JSON-over-Shift-JIS provider: the broadcast channel publishes bracket
//! lists and game payloads as Shift-JIS-encoded JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use kifu_core::record::{format_date, format_datetime, jst_offset};
use kifu_core::{split_player_name, text, DecodeError, MetadataKey, RecordDocument, Result};

use crate::model::{GameInfoList, GameListEntry, GameMetadata, PlayerIdentity};

/// Competitions carried by this provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Competition {
    /// 女流王将戦 (natural-key prefix `L`).
    JoryuOsho,
    /// 銀河戦 (natural-key prefix `g`).
    Ginga,
}

impl Competition {
    fn key_prefix(self) -> char {
        match self {
            Competition::JoryuOsho => 'L',
            Competition::Ginga => 'g',
        }
    }

    fn tournament(self) -> &'static str {
        match self {
            Competition::JoryuOsho => "女流王将戦",
            Competition::Ginga => "銀河戦",
        }
    }

    fn base_title(self, ki: i64) -> String {
        match self {
            Competition::JoryuOsho => format!("霧島酒造杯第{ki}期女流王将戦"),
            Competition::Ginga => format!("第{ki}期銀河戦"),
        }
    }
}

/// Bracket positions in id order. `K` is the championship bracket; the
/// other letters are preliminary blocks (`I` is unused by the provider).
const BLOCK_LETTERS: [char; 10] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K'];

/// Competition-number bias in the synthesized id space.
const ID_EPOCH: i64 = 20500;

/// Keeps the two competitions' id spaces disjoint.
const GINGA_ID_OFFSET: i64 = 10_000_000_000;

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    status: bool,
    kekkas: Vec<BracketRow>,
}

/// One bracket row; field names follow the provider's JSON keys.
#[derive(Debug, Deserialize)]
struct BracketRow {
    #[serde(rename = "KI")]
    ki: i64,
    #[serde(rename = "BLOCK")]
    block: String,
    #[serde(rename = "KAI")]
    kai: i64,
    #[serde(rename = "KYOKU")]
    kyoku: i64,
    #[serde(rename = "L_KISI")]
    left_player: String,
    #[serde(rename = "R_KISI")]
    right_player: String,
    #[serde(rename = "HOUEIDATE")]
    broadcast_date: String,
    #[serde(rename = "TAIKYOKUDATE")]
    played_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GameEnvelope {
    status: bool,
    kifus: Vec<KifuRow>,
    kekka: BracketRow,
}

#[derive(Debug, Deserialize)]
struct KifuRow {
    gyo: i64,
    data1: String,
}

/// Decode a bracket-list payload.
pub fn decode_list(buf: &[u8], competition: Competition) -> Result<GameInfoList> {
    let decoded = text::normalize_text(&text::decode_shift_jis(buf));
    let envelope: ListEnvelope = serde_json::from_str(&decoded)?;
    if !envelope.status {
        return Err(DecodeError::Schema("provider reported failure".into()));
    }
    let mut games = Vec::new();
    for row in &envelope.kekkas {
        games.push(entry_from_row(row, competition)?);
    }
    let count = games.len();
    tracing::debug!(count, ?competition, "decoded bracket list");
    Ok(GameInfoList { games, count })
}

/// Decode a game payload: the CSA rows joined in row order, plus the
/// standard-metadata overlay for the bracket row it embeds.
pub fn import_game(buf: &[u8], competition: Competition) -> Result<RecordDocument> {
    // Game payloads hold CSA rows verbatim; no glyph folding here.
    let decoded = text::decode_shift_jis(buf);
    let envelope: GameEnvelope = serde_json::from_str(&decoded)?;
    if !envelope.status {
        return Err(DecodeError::Schema("provider reported failure".into()));
    }

    let mut rows = envelope.kifus;
    rows.sort_by_key(|row| row.gyo);
    let csa = rows
        .iter()
        .map(|row| row.data1.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if csa.is_empty() {
        return Err(DecodeError::NoMoves);
    }

    let row = &envelope.kekka;
    let block = block_letter(&row.block)?;
    let black = identity_from_combined(&row.left_player)?;
    let white = identity_from_combined(&row.right_player)?;
    let start_time = parse_bracket_date(date_source(row))?;

    let mut metadata = vec![
        (MetadataKey::BlackName, black.name),
        (MetadataKey::WhiteName, white.name),
        (MetadataKey::Date, format_date(&start_time)),
        (MetadataKey::StartDatetime, format_datetime(&start_time)),
    ];
    if let Some(played) = nonempty(&row.played_date) {
        metadata.push((MetadataKey::EndDatetime, format_datetime(&parse_bracket_date(played)?)));
    }
    metadata.push((
        MetadataKey::Tournament,
        competition.tournament().to_string(),
    ));
    metadata.push((
        MetadataKey::Title,
        compose_title(competition, row.ki, block, row.kai, row.kyoku),
    ));
    Ok(RecordDocument { csa, metadata })
}

fn entry_from_row(row: &BracketRow, competition: Competition) -> Result<GameListEntry> {
    let block = block_letter(&row.block)?;
    let start_time = parse_bracket_date(date_source(row))?;
    let end_time = nonempty(&row.played_date)
        .map(parse_bracket_date)
        .transpose()?;

    Ok(GameListEntry {
        game_id: synthesize_game_id(competition, row.ki, block, row.kai, row.kyoku)?,
        secondary_id: None,
        key: Some(format!(
            "{}{}{}0{}0{}",
            competition.key_prefix(),
            row.ki,
            block,
            row.kai,
            row.kyoku
        )),
        black: identity_from_combined(&row.left_player)?,
        white: identity_from_combined(&row.right_player)?,
        metadata: GameMetadata {
            date: format_date(&start_time),
            start_time,
            end_time,
            title: compose_title(competition, row.ki, block, row.kai, row.kyoku),
            tournament: Some(competition.tournament().to_string()),
            length: 0,
            place: None,
            strategy: None,
        },
    })
}

/// Synthesize the integer game id from the bracket coordinates, stacking
/// competition number, block-letter index, round and match-within-round;
/// see DESIGN.md for the derivation.
fn synthesize_game_id(
    competition: Competition,
    ki: i64,
    block: char,
    kai: i64,
    kyoku: i64,
) -> Result<i64> {
    let block_index = BLOCK_LETTERS
        .iter()
        .position(|&b| b == block)
        .ok_or(DecodeError::BlockLetter(block))? as i64;
    let id = (((ID_EPOCH + ki) * 100 + block_index) * 100 + kai) * 100 + kyoku;
    Ok(match competition {
        Competition::JoryuOsho => id,
        Competition::Ginga => id - GINGA_ID_OFFSET,
    })
}

/// Title composition: competition base plus the round label.
fn compose_title(competition: Competition, ki: i64, block: char, kai: i64, kyoku: i64) -> String {
    format!(
        "{}{}",
        competition.base_title(ki),
        round_label(block, kai, kyoku)
    )
}

/// Round naming within a bracket; the championship rounds are special-cased
/// and the final is a best-of-three.
fn round_label(block: char, kai: i64, kyoku: i64) -> String {
    if block != 'K' {
        return format!("{block}ブロック{kai}回戦");
    }
    match kai {
        1 | 2 => format!("決勝トーナメント{kai}回戦"),
        3 => "準々決勝".to_string(),
        4 => "準決勝".to_string(),
        _ => format!("決勝三番勝負第{kyoku}局"),
    }
}

/// Single uppercase block letter out of the provider's one-char field.
fn block_letter(block: &str) -> Result<char> {
    let letter = block
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or(DecodeError::BlockLetter(' '))?;
    if BLOCK_LETTERS.contains(&letter) {
        Ok(letter)
    } else {
        Err(DecodeError::BlockLetter(letter))
    }
}

/// The played date when present, otherwise the broadcast date.
fn date_source(row: &BracketRow) -> &str {
    nonempty(&row.played_date).unwrap_or(&row.broadcast_date)
}

fn nonempty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Combined "name + rank" field into the common identity, with the
/// surname/given-name heuristic split.
fn identity_from_combined(combined: &str) -> Result<PlayerIdentity> {
    let player = split_player_name(combined)?;
    let (last_name, first_name) = split_full_name(&player.name);
    Ok(PlayerIdentity::from_parts(
        &last_name,
        &first_name,
        player.rank.as_deref(),
    ))
}

/// Surnames longer than two characters that defeat the fallback split.
const LONG_SURNAMES: &[&str] = &["佐々木", "三枚堂", "阿久津", "安用寺", "長谷部", "長谷川"];

/// Split a full name into surname and given name: the long-surname table
/// first, then whitespace, then the two-character fallback.
fn split_full_name(full: &str) -> (String, String) {
    let trimmed = full.trim();
    for surname in LONG_SURNAMES {
        if let Some(rest) = trimmed.strip_prefix(surname) {
            return (surname.to_string(), rest.trim().to_string());
        }
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() >= 2 {
        return (parts[0].to_string(), parts[1..].join(" "));
    }
    let last: String = trimmed.chars().take(2).collect();
    let first: String = trimmed.chars().skip(2).collect();
    (last, first)
}

/// Bracket date strings: ISO-ish dates, optionally with a time, JST
/// wall-clock.
fn parse_bracket_date(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return jst_wall_clock_to_utc(naive, input);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return jst_wall_clock_to_utc(naive, input);
            }
        }
    }
    Err(DecodeError::DateFormat(input.to_string()))
}

fn jst_wall_clock_to_utc(naive: NaiveDateTime, source: &str) -> Result<DateTime<Utc>> {
    naive
        .and_local_timezone(jst_offset())
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| DecodeError::DateFormat(source.to_string()))
}
