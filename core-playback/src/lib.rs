//! # Playback Session Module
//!
//! Background audio playback tied to a persistent, tappable notification.
//!
//! ## Overview
//!
//! This module handles:
//! - The session transition table ([`machine`]), free of I/O
//! - Normalising start requests against configured defaults ([`request`])
//! - Driving host collaborators from the table under a single lock
//!   ([`session`])
//!
//! At most one session is active at a time. A start while starting or
//! playing is dropped; stop, tap, renderer failure and non-looping
//! completion all return the session to idle and withdraw the notification.

pub mod error;
pub mod machine;
pub mod request;
pub mod session;

pub use error::{PlaybackError, Result};
pub use machine::{
    NotificationMetadata, SessionEffect, SessionMachine, SessionRecord, SessionSnapshot,
    SessionState, SessionTrigger, TapEvent,
};
pub use request::{ResolvedStart, StartRequest};
pub use session::{PlaybackSession, SessionDependencies, TapHandler};
