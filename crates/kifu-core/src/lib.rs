//! Decoding engine for proprietary shogi game-record feeds.
//!
//! This crate provides:
//! - Magic-byte frame scanning and data-dependent field chunking
//! - Per-message-type decoders for the binary list/detail formats
//! - Shift-JIS decoding and glyph normalization
//! - CSA move-notation translation for the external record importer
//! - Game-list and game-bundle assembly
//! - Player name/rank segmentation and the tournament catalog
//!
//! Everything is synchronous and side-effect-free over immutable byte
//! buffers; fetching those buffers is the caller's concern.

pub mod bundle;
pub mod csa;
pub mod error;
pub mod list;
pub mod message;
pub mod name;
pub mod record;
pub mod scan;
pub mod text;
pub mod tournament;

// Re-export from bundle module
pub use bundle::{assemble_bundle, GameBundle};

// Re-export from error module
pub use error::{DecodeError, ErrorKind, Result};

// Re-export from list module
pub use list::{decode_game_list, GameList, FRAME_HEADER_LEN};

// Re-export from message module
pub use message::{
    decode_game_info, decode_game_summary, decode_message, decode_move_event, decode_player_info,
    DecodedMessage, GameInfo, GameSummary, MoveEvent, PlayerInfo, SummaryPlayer, GAME_INFO_MAGIC,
    MOVE_EVENT_MAGIC, PLAYER_INFO_MAGIC,
};

// Re-export from name module
pub use name::{split_player_name, PlayerName};

// Re-export from record module
pub use record::{export_record, MetadataKey, RecordDocument};
