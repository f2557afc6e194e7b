//! Splitting combined "name + rank/title" strings from provider feeds.
//!
//! The catalog is data driven: adding a newly created title is a one-line
//! change here, never a decoder change.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};
use crate::text;

/// Player display name and the rank or title it carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerName {
    pub name: String,
    pub rank: Option<String>,
}

/// Recognized rank and title suffix tokens: regular ranks, major titles,
/// multi-crown forms, women's titles and ranks, lifetime titles. `龍王` is
/// the old-glyph variant some feeds still emit.
static RANK_TOKENS: &[&str] = &[
    "九段", "八段", "七段", "六段", "五段", "四段", "三段", "二段", "初段",
    "名人", "竜王", "龍王", "王位", "王座", "棋聖", "棋王", "王将", "叡王",
    "二冠", "三冠", "四冠", "五冠", "六冠", "七冠", "八冠",
    "女流名人", "女流王座", "女流王位", "女流王将", "女王",
    "倉敷藤花", "清麗", "白玲",
    "女流六段", "女流五段", "女流四段", "女流三段", "女流二段", "女流初段",
    "女流1級", "女流2級",
    "永世竜王", "永世王位", "名誉王座", "永世棋聖", "永世棋王", "永世王将", "永世叡王",
];

/// Generational champion forms: `十九世名人`, or the arabic `19世名人` that
/// some feeds emit before canonicalization.
const GENERATION_PATTERN: &str = "(?:[0-9]{1,2}|[一二三四五六七八九十]{1,3})世名人";

/// Canonical separator between concatenated titles.
const TITLE_SEPARATOR: char = '・';

/// Alternation over every catalog token, longest first. The regex engine
/// prefers earlier branches, so a short title must not shadow a longer one
/// it prefixes (`王将` inside `女流王将`).
fn suffix_alternation() -> String {
    let mut tokens: Vec<String> = RANK_TOKENS.iter().map(|t| regex::escape(t)).collect();
    tokens.push(GENERATION_PATTERN.to_string());
    tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    tokens.join("|")
}

static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = suffix_alternation();
    Regex::new(&format!("^(.+?)((?:(?:{alternation})・?)+)$")).expect("static suffix pattern")
});

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = suffix_alternation();
    Regex::new(&format!("^(?:{alternation})")).expect("static token pattern")
});

static GENERATION_ARABIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^([0-9]{1,2})世名人$").expect("static generation pattern"));

/// Split a combined name + rank string.
///
/// The trailing suffix must match the catalog; no match is a format error.
/// The suffix is canonicalized (parenthetical stripped, arabic generation
/// numerals converted to kanji, separators inserted between concatenated
/// titles) and the remaining prefix, trimmed and normalized, is the name.
pub fn split_player_name(raw: &str) -> Result<PlayerName> {
    let normalized = text::normalize_text(raw);
    let stripped = strip_parenthetical(normalized.trim());
    let caps = SUFFIX_RE
        .captures(stripped)
        .ok_or_else(|| DecodeError::NameFormat(raw.to_string()))?;
    let name = caps[1].trim().to_string();
    let rank = canonicalize_rank(&caps[2]);
    Ok(PlayerName {
        name,
        rank: Some(rank),
    })
}

/// Drop a trailing parenthetical annotation and everything after it.
/// `normalize_text` has already folded the full-width paren to ASCII.
fn strip_parenthetical(s: &str) -> &str {
    match s.find(|c| c == '(' || c == '（') {
        Some(at) => s[..at].trim_end(),
        None => s,
    }
}

fn canonicalize_rank(suffix: &str) -> String {
    let tokens = tokenize_suffix(suffix);
    let converted: Vec<String> = tokens.iter().map(|t| convert_generation(t)).collect();
    converted.join(&TITLE_SEPARATOR.to_string())
}

/// Re-tokenize a matched suffix, longest token first, dropping any
/// separators already present so the join is canonical.
fn tokenize_suffix(suffix: &str) -> Vec<String> {
    let mut rest = suffix;
    let mut tokens = Vec::new();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix(TITLE_SEPARATOR) {
            rest = after;
            continue;
        }
        match TOKEN_RE.find(rest) {
            Some(m) => {
                tokens.push(m.as_str().to_string());
                rest = &rest[m.end()..];
            }
            // Unreachable after SUFFIX_RE matched, but never loop forever.
            None => {
                tokens.push(rest.to_string());
                break;
            }
        }
    }
    tokens
}

/// `19世名人` → `十九世名人`; anything else passes through.
fn convert_generation(token: &str) -> String {
    match GENERATION_ARABIC_RE.captures(token) {
        Some(caps) => {
            let n: u32 = caps[1].parse().unwrap_or(0);
            format!("{}世名人", kanji_number(n))
        }
        None => token.to_string(),
    }
}

/// Kanji numeral for 0..=99 (`19` → `十九`).
fn kanji_number(n: u32) -> String {
    const DIGITS: [&str; 10] = ["", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    if n == 0 {
        return "〇".to_string();
    }
    let tens = (n / 10) as usize;
    let ones = (n % 10) as usize;
    let mut s = String::new();
    if tens >= 2 {
        s.push_str(DIGITS[tens]);
    }
    if tens >= 1 {
        s.push('十');
    }
    s.push_str(DIGITS[ones]);
    s
}
