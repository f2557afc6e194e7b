//! Shift-JIS decoding and glyph normalization for provider text fields.

use encoding_rs::SHIFT_JIS;

/// Decode Shift-JIS bytes into a `String`, replacing invalid sequences.
pub fn decode_shift_jis(bytes: &[u8]) -> String {
    let (text, _, _) = SHIFT_JIS.decode(bytes);
    text.into_owned()
}

/// Encode text back to Shift-JIS, replacing unmappable characters.
/// The decoders never need this; fixtures and round-trip checks do.
pub fn encode_shift_jis(text: &str) -> Vec<u8> {
    let (bytes, _, _) = SHIFT_JIS.encode(text);
    bytes.into_owned()
}

/// Fold full-width digits to ASCII (`０` → `0`).
///
/// Applied alone to opening/strategy fields, which must keep their other
/// full-width glyphs intact.
pub fn to_half_width_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF10}'..='\u{FF19}' => fold_full_width(c),
            _ => c,
        })
        .collect()
}

/// Canonical glyph normalization applied to every decoded free-text field.
///
/// Folds, in order: full-width punctuation and digits (U+FF08..U+FF19) and
/// full-width Latin letters to ASCII, the ideographic space to a plain
/// space, the triangle glyphs to the shogi move indicators (△ → ☖,
/// ▲ → ☗), the full-width tilde to ASCII, and the katakana middle dot to
/// its half-width form.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF08}'..='\u{FF19}' => fold_full_width(c),
            '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => fold_full_width(c),
            '\u{3000}' => ' ',
            '\u{25B3}' => '\u{2616}',
            '\u{25B2}' => '\u{2617}',
            '\u{FF5E}' => '~',
            '\u{30FB}' => '\u{FF65}',
            _ => c,
        })
        .collect()
}

fn fold_full_width(c: char) -> char {
    char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
}
