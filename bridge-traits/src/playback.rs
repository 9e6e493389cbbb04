//! Audio renderer bridge.
//!
//! The renderer is the host's decoder/player (Android `MediaPlayer`, iOS
//! `AVPlayer`, a desktop audio backend). Preparation is asynchronous: the
//! host reports readiness, failure and end-of-stream through a
//! [`RendererListener`] handed over with each prepare request. Every signal
//! carries the [`PlaybackSessionId`] it belongs to so the core can discard
//! signals from sessions it has already torn down.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Generation token identifying one prepared renderer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaybackSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What kind of audio is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioContentType {
    Music,
    Speech,
    Sonification,
}

/// Why the audio is being played; hosts use this for routing and ducking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioUsage {
    Media,
    Alarm,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAttributes {
    pub content_type: AudioContentType,
    pub usage: AudioUsage,
}

impl Default for AudioAttributes {
    fn default() -> Self {
        Self {
            content_type: AudioContentType::Music,
            usage: AudioUsage::Media,
        }
    }
}

/// Request to open and asynchronously prepare a remote stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererRequest {
    pub session: PlaybackSessionId,
    pub url: String,
    /// Restart automatically at end of stream. Hosts that loop natively never
    /// report [`RendererSignal::Completed`] for looping sessions.
    pub looping: bool,
    pub attributes: AudioAttributes,
}

/// Asynchronous notifications emitted by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererSignal {
    /// Source opened and decoder primed; playback may begin.
    Ready,
    /// Source could not be opened or decoding failed.
    Error { message: String },
    /// End of stream reached.
    Completed,
}

/// Callback sink for renderer signals.
///
/// Called from whatever thread the host delivers callbacks on. Implementations
/// must not block.
pub trait RendererListener: Send + Sync {
    fn on_signal(&self, session: PlaybackSessionId, signal: RendererSignal);
}

/// Host audio renderer.
#[async_trait::async_trait]
pub trait AudioRenderer: Send + Sync {
    /// Open the source and start asynchronous preparation. Returning an error
    /// means preparation could not even be requested (e.g. malformed URL).
    async fn prepare(
        &self,
        request: RendererRequest,
        listener: Arc<dyn RendererListener>,
    ) -> Result<()>;

    /// Begin playback of a prepared session.
    async fn start(&self, session: PlaybackSessionId) -> Result<()>;

    /// Stop if playing and free the renderer. Unknown sessions are a no-op.
    async fn release(&self, session: PlaybackSessionId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_unique() {
        let a = PlaybackSessionId::new();
        let b = PlaybackSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, PlaybackSessionId::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn default_attributes_are_music_media() {
        let attrs = AudioAttributes::default();
        assert_eq!(attrs.content_type, AudioContentType::Music);
        assert_eq!(attrs.usage, AudioUsage::Media);
    }
}
