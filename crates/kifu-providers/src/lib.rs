//! Provider adapters over the `kifu-core` decoding engine.
//!
//! Each adapter turns one provider's raw payloads (already fetched by the
//! caller) into the common [`model::GameInfoList`] shape and, where the
//! provider carries full games, into [`kifu_core::RecordDocument`] values
//! for the external record importer.

pub mod igoshogi;
pub mod jsam;
pub mod meijin;
pub mod model;

pub use model::{GameInfoList, GameListEntry, GameMetadata, PlayerIdentity};
