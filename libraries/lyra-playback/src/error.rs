//! Error types for playback management

use lyra_core::ServiceError;
use thiserror::Error;

/// Playback errors
///
/// None of these are fatal: every variant leaves the controller in a
/// consistent, quiescent state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlaybackError {
    /// Queue construction with an empty list or an out-of-range start index
    #[error("Invalid queue: start index {start_index} for {len} tracks")]
    InvalidQueue { len: usize, start_index: usize },

    /// No track is targeted (nothing current and none given)
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Favorites need a signed-in identity
    #[error("Not signed in")]
    NotSignedIn,

    /// The media could not be resolved or decoded
    #[error("Media error: {0}")]
    Media(String),

    /// The platform refused to start playback (autoplay policy, ...)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// Favorites operation failed
    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

/// Audio output errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutputError {
    /// Nothing usable is bound (never loaded, or the load failed)
    #[error("No media bound")]
    NotLoaded,

    /// The platform refused to start playback
    #[error("Playback rejected by platform: {0}")]
    Rejected(String),

    /// The output was already released
    #[error("Audio output disposed")]
    Disposed,
}

/// Favorites store errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FavoritesError {
    /// Remote persistence call failed, local state was reconciled
    #[error("Favorites service error: {0}")]
    Remote(#[from] ServiceError),

    /// The signed-in identity changed while the call was in flight
    #[error("Identity changed while the request was in flight")]
    IdentityChanged,

    /// The set is loaded for another identity
    #[error("Favorites are loaded for {loaded}, not {requested}")]
    IdentityMismatch { loaded: String, requested: String },
}

impl From<OutputError> for PlaybackError {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::Rejected(reason) => PlaybackError::PlaybackRejected(reason),
            other => PlaybackError::Media(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
