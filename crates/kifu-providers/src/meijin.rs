//! Delimited-text provider: the championship bulletin service publishes its
//! game list as Shift-JIS text blocks of `key = value` lines.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use kifu_core::{
    split_player_name, text, tournament, DecodeError, MetadataKey, Result,
};

use crate::model::{GameInfoList, GameListEntry, GameMetadata, PlayerIdentity};

/// Line separating two blocks in the list payload.
const BLOCK_SEPARATOR: &str = "/-----";

/// Literal date formats the bulletin emits. The numeric fields accept
/// unpadded components, so `2025/9/24 10:00` parses with the first format.
const DATETIME_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y/%m/%d"];

static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*//.*$").expect("static comment pattern"));

static LEADING_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("static leading-int pattern"));

/// Parse one of the provider's literal date strings into an instant.
///
/// The strings are JST wall-clock, but this pipeline has always parsed them
/// as if they were UTC and then subtracted nine hours to compensate. The
/// subtraction is preserved exactly and stays confined to this provider;
/// see DESIGN.md before touching it.
pub fn parse_provider_date(input: &str) -> Result<DateTime<Utc>> {
    let naive = parse_naive(input)?;
    Ok(Utc.from_utc_datetime(&naive) - Duration::hours(9))
}

fn parse_naive(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive);
            }
        }
    }
    Err(DecodeError::DateFormat(input.to_string()))
}

/// Decode the whole list payload.
///
/// The first block is the banner and the last is the footer; every block in
/// between is one game.
pub fn decode_list(buf: &[u8]) -> Result<GameInfoList> {
    let decoded = text::normalize_text(&text::decode_shift_jis(buf));
    if decoded.trim().is_empty() {
        return Err(DecodeError::Schema("empty list payload".into()));
    }
    let blocks: Vec<&str> = decoded.split(BLOCK_SEPARATOR).map(str::trim).collect();
    let body = if blocks.len() > 2 {
        &blocks[1..blocks.len() - 1]
    } else {
        &[][..]
    };

    let mut games = Vec::new();
    for block in body {
        games.push(entry_from_block(block)?);
    }
    let count = games.len();
    tracing::debug!(count, "decoded bulletin list");
    Ok(GameInfoList { games, count })
}

/// `key = value` lines of one block, trailing `//` comments stripped.
fn parse_fields(block: &str) -> HashMap<String, String> {
    block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let line = LINE_COMMENT_RE.replace(line, "");
            let mut parts = line.split('=');
            let key = parts.next().unwrap_or_default().trim().to_string();
            let value = parts.next().unwrap_or_default().trim().to_string();
            (key, value)
        })
        .collect()
}

fn entry_from_block(block: &str) -> Result<GameListEntry> {
    let fields = parse_fields(block);
    let start_date = required(&fields, "start_date")?;
    let end_date = optional(&fields, "end_date");
    let kisen = required(&fields, "kisen")?;

    Ok(GameListEntry {
        game_id: required_int(&fields, "game_id")?,
        secondary_id: Some(required_int(&fields, "meijin_id")?),
        key: Some(required(&fields, "kif_key")?.to_string()),
        black: PlayerIdentity::from_parts(
            required(&fields, "family1")?,
            required(&fields, "name1")?,
            Some(required(&fields, "title1")?),
        ),
        white: PlayerIdentity::from_parts(
            required(&fields, "family2")?,
            required(&fields, "name2")?,
            Some(required(&fields, "title2")?),
        ),
        metadata: GameMetadata {
            date: parse_naive(start_date)?.format("%Y/%m/%d").to_string(),
            start_time: parse_provider_date(start_date)?,
            end_time: end_date.map(parse_provider_date).transpose()?,
            title: kisen.to_string(),
            tournament: tournament::resolve(kisen).map(str::to_string),
            length: required_int(&fields, "tesuu")? as u32,
            place: None,
            strategy: optional(&fields, "senkei").map(str::to_string),
        },
    })
}

fn required<'a>(fields: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    match fields.get(key).map(String::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DecodeError::Schema(format!("missing required field {key:?}"))),
    }
}

fn optional<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn required_int(fields: &HashMap<String, String>, key: &str) -> Result<i64> {
    required(fields, key)?
        .parse()
        .map_err(|_| DecodeError::Schema(format!("field {key:?} is not an integer")))
}

/// Post-import fix-ups for a bulletin record's standard metadata.
///
/// The external importer reads the bulletin's KIF text as-is; this pass
/// then normalizes what it produced: datetimes reformatted to the importer
/// convention, the `N分`-style time limit scaled to seconds and mirrored to
/// both sides, byoyomi truncated to its leading seconds, player names split
/// off their ranks, escaped newlines dropped from the note, and the raw
/// event name moved to the title with the tournament resolved from the
/// catalog.
pub fn normalize_overlay(
    entries: Vec<(MetadataKey, String)>,
) -> Result<Vec<(MetadataKey, String)>> {
    let mut entries = entries;

    if let Some(start) = get(&entries, MetadataKey::StartDatetime) {
        let naive = parse_naive(&start)?;
        let formatted = naive.format("%Y/%m/%d %H:%M:%S").to_string();
        set(&mut entries, MetadataKey::StartDatetime, formatted);
        set(
            &mut entries,
            MetadataKey::Date,
            naive.format("%Y/%m/%d").to_string(),
        );
    }
    if let Some(end) = get(&entries, MetadataKey::EndDatetime) {
        let formatted = parse_naive(&end)?.format("%Y/%m/%d %H:%M:%S").to_string();
        set(&mut entries, MetadataKey::EndDatetime, formatted);
    }
    if let Some(limit) = get(&entries, MetadataKey::TimeLimit) {
        if let Some(minutes) = leading_int(&limit) {
            let seconds = (minutes * 60).to_string();
            set(&mut entries, MetadataKey::TimeLimit, seconds.clone());
            set(&mut entries, MetadataKey::BlackTimeLimit, seconds.clone());
            set(&mut entries, MetadataKey::WhiteTimeLimit, seconds);
        }
    }
    if let Some(byoyomi) = get(&entries, MetadataKey::Byoyomi) {
        if let Some(seconds) = leading_int(&byoyomi) {
            set(&mut entries, MetadataKey::Byoyomi, seconds.to_string());
        }
    }
    for key in [MetadataKey::BlackName, MetadataKey::WhiteName] {
        if let Some(combined) = get(&entries, key) {
            set(&mut entries, key, split_player_name(&combined)?.name);
        }
    }
    if let Some(note) = get(&entries, MetadataKey::Note) {
        set(&mut entries, MetadataKey::Note, note.replace("\\n", ""));
    }
    if let Some(event_name) = get(&entries, MetadataKey::Tournament) {
        set(&mut entries, MetadataKey::Title, event_name.clone());
        if let Some(resolved) = tournament::resolve(&event_name) {
            set(&mut entries, MetadataKey::Tournament, resolved.to_string());
        }
    }
    Ok(entries)
}

fn get(entries: &[(MetadataKey, String)], key: MetadataKey) -> Option<String> {
    entries
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.clone())
}

fn set(entries: &mut Vec<(MetadataKey, String)>, key: MetadataKey, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

fn leading_int(value: &str) -> Option<i64> {
    LEADING_INT_RE
        .captures(value)
        .and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = "\
meijinsen kifu list // banner
/-----
game_id = 19308
meijin_id = 15048
kif_key = /pay/kif/meijinsen/2025/09/24/A1/15048.txt
start_date = 2025/09/24 10:00
end_date = 2025/09/24 19:21
kisen = 第84期順位戦Ａ級１回戦 // raw event name
sente = 佐藤天彦
gote = 豊島将之
family1 = 佐藤
name1 = 天彦
title1 = 九段
family2 = 豊島
name2 = 将之
title2 = 九段
senkei = 角換わり
tesuu = 115
/-----
footer";

    #[test]
    fn test_decode_list_blocks() {
        let list = decode_list(&text::encode_shift_jis(SAMPLE)).unwrap();
        assert_eq!(list.count, 1);
        let game = &list.games[0];
        assert_eq!(game.game_id, 19308);
        assert_eq!(game.secondary_id, Some(15048));
        assert_eq!(
            game.key.as_deref(),
            Some("/pay/kif/meijinsen/2025/09/24/A1/15048.txt")
        );
        assert_eq!(game.black.name, "佐藤 天彦");
        assert_eq!(game.black.rank.as_deref(), Some("九段"));
        // The line comment is stripped and full-width glyphs are folded.
        assert_eq!(game.metadata.title, "第84期順位戦A級1回戦");
        assert_eq!(game.metadata.tournament.as_deref(), Some("名人戦"));
        assert_eq!(game.metadata.length, 115);
        assert_eq!(game.metadata.strategy.as_deref(), Some("角換わり"));
        assert_eq!(game.metadata.date, "2025/09/24");
    }

    #[test]
    fn test_nine_hour_compensation() {
        // Parsed as UTC then shifted back nine hours, exactly as upstream.
        let t = parse_provider_date("2025/09/24 10:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 9, 24, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_unpadded_and_padded_dates_agree() {
        let a = parse_provider_date("2025/09/24 10:00").unwrap();
        let b = parse_provider_date("2025/9/24 10:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_date_only_format() {
        let t = parse_provider_date("2025/09/24").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 9, 23, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_unknown_date_format_is_format_error() {
        let err = parse_provider_date("Sep 24, 2025").unwrap_err();
        assert!(matches!(err, DecodeError::DateFormat(_)));
    }

    #[test]
    fn test_missing_required_field() {
        let payload = "banner\n/-----\ngame_id = 1\n/-----\nfooter";
        let err = decode_list(payload.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn test_normalize_overlay_fixups() {
        let entries = vec![
            (MetadataKey::StartDatetime, "2025/9/24 9:00".to_string()),
            (MetadataKey::EndDatetime, "2025/9/24 19:21".to_string()),
            (MetadataKey::TimeLimit, "360分".to_string()),
            (MetadataKey::Byoyomi, "60秒".to_string()),
            (MetadataKey::BlackName, "佐藤天彦九段".to_string()),
            (MetadataKey::WhiteName, "豊島将之九段".to_string()),
            (MetadataKey::Note, "一行目\\n二行目".to_string()),
            (MetadataKey::Tournament, "第84期順位戦".to_string()),
        ];
        let fixed = normalize_overlay(entries).unwrap();
        let lookup = |key| get(&fixed, key).unwrap();
        assert_eq!(lookup(MetadataKey::StartDatetime), "2025/09/24 09:00:00");
        assert_eq!(lookup(MetadataKey::Date), "2025/09/24");
        assert_eq!(lookup(MetadataKey::EndDatetime), "2025/09/24 19:21:00");
        assert_eq!(lookup(MetadataKey::TimeLimit), "21600");
        assert_eq!(lookup(MetadataKey::BlackTimeLimit), "21600");
        assert_eq!(lookup(MetadataKey::WhiteTimeLimit), "21600");
        assert_eq!(lookup(MetadataKey::Byoyomi), "60");
        assert_eq!(lookup(MetadataKey::BlackName), "佐藤天彦");
        assert_eq!(lookup(MetadataKey::Note), "一行目二行目");
        assert_eq!(lookup(MetadataKey::Title), "第84期順位戦");
        assert_eq!(lookup(MetadataKey::Tournament), "名人戦");
    }
}
