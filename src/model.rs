use serde::{Deserialize, Serialize};

/// A playable catalog entry. The catalog owns tracks; the engine only keeps
/// references to them by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub author: String,
    pub uploader: String,
    /// Length in whole seconds.
    pub duration: u64,
}

/// Why the player stopped delivering the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Played through to the natural end.
    Terminated,
    /// Explicit user stop.
    Stop,
    /// Another track took over mid-play.
    Replaced,
    Error,
}

/// Exclusion strength for a blacklisted track.
///
/// `Ignored` tracks still pass the blacklist gate during eligibility checks;
/// `FullIgnored` tracks are kept out of the candidate queue entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlacklistStatus {
    Ignored,
    FullIgnored,
}
