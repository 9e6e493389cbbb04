//! # Event Bus System
//!
//! Broadcasts playback session lifecycle changes using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The session owner publishes a [`CoreEvent`] on every state change. The
//! bus is purely observational: tap delivery to the application layer does
//! not go through it, so a missing or lagging subscriber never affects the
//! session.
//!
//! ```text
//! ┌─────────────────┐     emit      ┌───────────┐    subscribe    ┌────────────┐
//! │ PlaybackSession ├──────────────>│ EventBus  ├────────────────>│ Diagnostics│
//! └─────────────────┘               └───────────┘                 └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SessionEvent, StopReason};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Session(SessionEvent::Stopped {
//!     session_id: None,
//!     reason: StopReason::Requested,
//! }))
//! .ok();
//!
//! let event = rx.recv().await.unwrap();
//! assert_eq!(event.description(), "Session stopped");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; keep reading.
//! - **`RecvError::Closed`**: every sender is gone; treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Session(SessionEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::Failed { .. }) => EventSeverity::Warning,
            CoreEvent::Session(SessionEvent::Starting { .. })
            | CoreEvent::Session(SessionEvent::Tapped { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Why a session returned to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The application asked for it.
    Requested,
    /// A non-looping stream reached its end.
    Completed,
    /// The user tapped the notification.
    Tapped,
    /// The owning background context is going away.
    Shutdown,
}

// ============================================================================
// Session Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// Start accepted; notification shown and renderer preparing.
    Starting {
        session_id: String,
        title: String,
        /// Redacted stream URL.
        url: String,
        looping: bool,
    },
    /// Start accepted without a stream: notification only.
    NotificationShown { title: String },
    /// Renderer reported ready and playback began.
    Playing { session_id: String },
    /// Session returned to idle.
    Stopped {
        session_id: Option<String>,
        reason: StopReason,
    },
    /// Renderer failed; session returned to idle.
    Failed { session_id: String, message: String },
    /// Tap forwarded to the application layer.
    Tapped { timestamp: i64, title: String },
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::Starting { .. } => "Session starting",
            SessionEvent::NotificationShown { .. } => "Notification shown without audio",
            SessionEvent::Playing { .. } => "Session playing",
            SessionEvent::Stopped { .. } => "Session stopped",
            SessionEvent::Failed { .. } => "Session failed",
            SessionEvent::Tapped { .. } => "Notification tapped",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus. Cloning shares the underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Subscribers falling more than `capacity` events behind get
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// `broadcast::Receiver` with an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event passing the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`EventStream::recv`]; `None` when drained.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
