//! Decode error types shared across the workspace.

use thiserror::Error;

/// Coarse classification of a [`DecodeError`].
///
/// Provider feeds fail in four distinct ways and callers react differently
/// to each: structural damage means the buffer is not the format at all,
/// while the other three mean one record should be skipped and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte stream is unusable: missing magic, truncated frame, buffer
    /// below the minimum viable size.
    Structural,
    /// A decoded field fails its shape contract (empty required text,
    /// counter out of range, malformed JSON payload).
    Schema,
    /// A text field matches none of the accepted literal forms.
    Format,
    /// The decoded pieces do not add up to a usable record.
    Semantic,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("magic bytes {0:02x?} not found")]
    MagicNotFound([u8; 2]),

    #[error("frame truncated: need {needed} bytes at offset {offset}, buffer has {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("buffer too short: {0} bytes")]
    BufferTooShort(usize),

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unparseable date {0:?}")]
    DateFormat(String),

    #[error("no rank or title suffix in {0:?}")]
    NameFormat(String),

    #[error("unknown block letter {0:?}")]
    BlockLetter(char),

    #[error("game record has no move frames")]
    NoMoves,
}

impl DecodeError {
    /// The failure family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::MagicNotFound(_)
            | DecodeError::Truncated { .. }
            | DecodeError::BufferTooShort(_) => ErrorKind::Structural,
            DecodeError::Schema(_) | DecodeError::Json(_) => ErrorKind::Schema,
            DecodeError::DateFormat(_)
            | DecodeError::NameFormat(_)
            | DecodeError::BlockLetter(_) => ErrorKind::Format,
            DecodeError::NoMoves => ErrorKind::Semantic,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
