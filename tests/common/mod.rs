//! Synthetic frame builders shared by the integration tests.
//!
//! These assemble byte-exact fixtures for the binary wire layouts: 2-byte
//! magic, separator/length header, then the fixed and length-prefixed
//! fields each message type declares.

// Not every test binary uses every builder.
#![allow(dead_code)]

use kifu_core::text::encode_shift_jis;

/// Game-information frame (`KI`), detail-endpoint layout.
#[allow(clippy::too_many_arguments)]
pub fn game_info_frame(
    game_id: u32,
    start: &str,
    end: &str,
    title: &str,
    opening: &str,
    location: &str,
    time_limit: u16,
    moves: u32,
) -> Vec<u8> {
    let title = encode_shift_jis(title);
    let opening = encode_shift_jis(opening);
    let location = encode_shift_jis(location);

    let mut f = Vec::new();
    f.extend_from_slice(b"KI");
    f.extend_from_slice(&[0, 0]); // separator
    f.extend_from_slice(&0u16.to_be_bytes()); // declared length (unused in detail)
    f.extend_from_slice(&game_id.to_be_bytes());
    f.extend_from_slice(start.as_bytes());
    f.extend_from_slice(end.as_bytes());
    f.push(title.len() as u8);
    f.extend_from_slice(&title);
    f.push(opening.len() as u8);
    f.extend_from_slice(&opening);
    f.extend_from_slice(&[0, 0]); // unknown
    f.extend_from_slice(&time_limit.to_be_bytes());
    f.push(location.len() as u8);
    f.extend_from_slice(&location);
    f.extend_from_slice(&moves.to_be_bytes());
    f.extend_from_slice(&[0, 0, 0]); // trailer
    f
}

/// Player-information frame (`BI`).
pub fn player_info_frame(is_black: bool, last: &str, first: &str) -> Vec<u8> {
    let last = encode_shift_jis(last);
    let first = encode_shift_jis(first);

    let mut f = Vec::new();
    f.extend_from_slice(b"BI");
    f.extend_from_slice(&[0, 0]);
    f.extend_from_slice(&0u16.to_be_bytes());
    f.push(if is_black { 1 } else { 0 });
    f.push(last.len() as u8);
    f.extend_from_slice(&last);
    f.push(first.len() as u8);
    f.extend_from_slice(&first);
    f.extend_from_slice(&[0, 0]);
    f
}

/// Move/comment frame (`KC`) with its own total length in the header, as
/// the detail endpoint frames carry it.
pub fn move_event_frame(moves: u16, piece: u8, prev: u8, next: u8, comment: &str) -> Vec<u8> {
    let comment = encode_shift_jis(comment);

    let mut f = Vec::new();
    f.extend_from_slice(b"KC");
    f.extend_from_slice(&[0, 0, 0, 0]); // total length patched below
    f.extend_from_slice(&moves.to_be_bytes());
    f.push(piece);
    f.push(prev);
    f.push(next);
    f.extend_from_slice(&7u32.to_be_bytes()); // consumed time
    f.extend_from_slice(&[0, 0]);
    f.extend_from_slice(&(comment.len() as u16).to_be_bytes());
    f.extend_from_slice(&comment);
    let total = f.len() as u32;
    f[2..6].copy_from_slice(&total.to_be_bytes());
    f
}

/// Summary frame (`KI` magic, list-endpoint layout) with the declared
/// length filled in so the list assembler accepts it.
pub fn summary_frame(
    game_id: u32,
    title: &str,
    moves: u8,
    black: (&str, &str, &str),
    white: (&str, &str, &str),
) -> Vec<u8> {
    let title = encode_shift_jis(title);

    let mut body = Vec::new();
    body.extend_from_slice(&game_id.to_be_bytes());
    body.extend_from_slice(b"202507201000");
    body.extend_from_slice(b"202507201830");
    body.push(title.len() as u8);
    body.extend_from_slice(&title);
    body.push(0); // opening length
    body.push(moves);
    body.push(0); // unknown
    body.extend_from_slice(&60u16.to_be_bytes()); // time limit
    for part in [black.0, black.1, black.2, white.0, white.1, white.2] {
        let encoded = encode_shift_jis(part);
        body.push(encoded.len() as u8);
        body.extend_from_slice(&encoded);
    }

    let mut frame = Vec::new();
    frame.extend_from_slice(b"KI");
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    frame
}

/// A full detail buffer: info frame, black and white player frames, then
/// the given move frames.
pub fn detail_buffer(info: Vec<u8>, events: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = info;
    buf.extend_from_slice(&player_info_frame(true, "佐藤", "天彦"));
    buf.extend_from_slice(&player_info_frame(false, "豊島", "将之"));
    for event in events {
        buf.extend_from_slice(event);
    }
    buf
}
