//! # Playback Error Types
//!
//! None of these cross the application boundary: the session absorbs
//! collaborator failures and logs them. They surface only from construction
//! and from requests made after shutdown.

use thiserror::Error;

/// Errors that can occur while driving a playback session.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// No Tokio runtime was available to host the renderer signal pump.
    #[error("No async runtime available: {0}")]
    RuntimeUnavailable(String),

    /// The session was shut down and no longer accepts requests.
    #[error("Playback session has been shut down")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
