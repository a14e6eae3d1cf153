//! Adaptive track filtering and autoplay queueing for a media bot.
//!
//! The host feeds catalog and playback events into an [`engine::AutoplayEngine`]
//! and applies the effects it returns; nothing in here talks to the player,
//! the network or the chat surface directly.

pub mod blacklist;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod preset;
pub mod store;

pub use blacklist::Blacklist;
pub use engine::{AutoplayEngine, Effect, PlayerEvent};
pub use error::EngineError;
pub use filter::{Filter, FilterKind, FilterSet};
pub use model::{BlacklistStatus, EndReason, Track};
pub use preset::PresetStore;
pub use store::{JsonFileStore, KvStore, MemoryStore};
