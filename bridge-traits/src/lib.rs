//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the audio alert core and the
//! platform it runs on. The core owns the playback session state machine; the
//! host supplies the facilities that actually draw notifications, decode
//! audio and talk to the application layer.
//!
//! ## Traits
//!
//! ### Session collaborators
//! - [`NotificationPresenter`](notification::NotificationPresenter) - Persistent, tappable system notification
//! - [`AudioRenderer`](playback::AudioRenderer) - Asynchronous remote stream decoder/player
//! - [`RendererListener`](playback::RendererListener) - Ready/error/completion callbacks from the renderer
//!
//! ### Application boundary
//! - [`MethodChannel`](channel::MethodChannel) - Outbound callbacks into the embedding application
//! - [`PlatformInfo`](platform::PlatformInfo) - OS version and application identifier
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation | Status |
//! |----------|----------------|--------|
//! | Desktop  | `bridge-desktop` | ✅ Available |
//! | Android  | Host plugin (foreground service + `MediaPlayer`) | 📋 Host-provided |
//! | iOS      | Host plugin | 📋 Host-provided |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). The session core
//! never propagates these to the application; it logs them and moves the
//! session to a safe state.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Renderer callbacks in particular
//! may arrive on any host thread.

pub mod channel;
pub mod error;
pub mod notification;
pub mod platform;
pub mod playback;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use channel::{MethodCall, MethodChannel, MethodResponse};
pub use notification::{
    NotificationCategory, NotificationChannelSpec, NotificationContent, NotificationIcon,
    NotificationImportance, NotificationPresenter, NotificationPriority,
};
pub use platform::PlatformInfo;
pub use playback::{
    AudioAttributes, AudioContentType, AudioRenderer, AudioUsage, PlaybackSessionId,
    RendererListener, RendererRequest, RendererSignal,
};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, StderrLogger, SystemClock};
