use thiserror::Error;

/// Everything that can go wrong inside the engine. All variants are
/// recoverable: a failed operation leaves the engine state unchanged and the
/// message is meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid filter, accepted syntax: (!)(title|author|uploader|duration):(keywords)")]
    InvalidFilterSyntax,
    #[error("unrecognized filter kind `{0}`")]
    InvalidFilterKind(String),
    #[error("duration filters accept only numbers, specify the value in seconds")]
    InvalidDurationValue,
    #[error("filter index {index} is out of range, there are {len} filters")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no preset named `{0}`")]
    PresetNotFound(String),
    #[error("preset names must be non-empty and alphanumeric")]
    InvalidPresetName,
    #[error("no tracks available to pick from")]
    NoTracksAvailable,
}
