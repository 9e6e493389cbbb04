//! # Session State Machine
//!
//! Pure transition table for the playback session. [`SessionMachine::apply`]
//! consumes one [`SessionTrigger`], updates the state and returns the
//! [`SessionEffect`]s the owner must carry out against the host. Nothing in
//! here touches a bridge, a clock or a lock, so every transition can be
//! exercised directly.
//!
//! | From | Trigger | Guard | To |
//! |------|---------|-------|----|
//! | Idle | Start | - | Starting (Idle when no URL) |
//! | Starting | RendererReady | same session | Playing |
//! | Starting/Playing | RendererError | same session | Idle |
//! | Starting/Playing | Stop / Shutdown | - | Idle |
//! | Playing | PlaybackCompleted | not looping | Idle |
//! | Playing | PlaybackCompleted | looping | Playing |
//! | any with notification | NotificationTapped | - | Idle |
//! | Starting/Playing | Start | - | unchanged |

use bridge_traits::{NotificationIcon, PlaybackSessionId};
use core_runtime::events::{SessionEvent, StopReason};
use core_runtime::logging::redact_url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::request::ResolvedStart;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Starting,
    Playing,
}

/// Notification metadata recorded when a start is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMetadata {
    pub title: String,
    pub body: String,
    /// Unix milliseconds at which the start was accepted.
    pub created_at: i64,
}

/// Most recent accepted start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Empty for notification-only sessions.
    pub stream_url: String,
    pub looping: bool,
    pub notification: NotificationMetadata,
}

/// Payload delivered to the application layer when the notification is
/// tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapEvent {
    pub timestamp: i64,
    pub title: String,
    pub body: String,
    pub url: String,
}

impl From<&SessionRecord> for TapEvent {
    fn from(record: &SessionRecord) -> Self {
        Self {
            timestamp: record.notification.created_at,
            title: record.notification.title.clone(),
            body: record.notification.body.clone(),
            url: record.stream_url.clone(),
        }
    }
}

/// External stimulus applied to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTrigger {
    Start {
        request: ResolvedStart,
        accepted_at: i64,
    },
    RendererReady {
        session: PlaybackSessionId,
    },
    RendererError {
        session: PlaybackSessionId,
        message: String,
    },
    PlaybackCompleted {
        session: PlaybackSessionId,
    },
    Stop,
    NotificationTapped,
    Shutdown,
}

/// Work the owner must perform after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    PresentNotification {
        title: String,
        body: String,
        icon: NotificationIcon,
    },
    WithdrawNotification,
    PrepareRenderer {
        session: PlaybackSessionId,
        url: String,
        looping: bool,
    },
    StartRenderer {
        session: PlaybackSessionId,
    },
    ReleaseRenderer {
        session: PlaybackSessionId,
    },
    EmitTap(TapEvent),
    Publish(SessionEvent),
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub is_active: bool,
    pub notification_visible: bool,
    pub session_id: Option<PlaybackSessionId>,
    pub record: Option<SessionRecord>,
}

#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    active: Option<PlaybackSessionId>,
    record: Option<SessionRecord>,
    notification_visible: bool,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            active: None,
            record: None,
            notification_visible: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// A renderer exists and has not been released.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_session(&self) -> Option<PlaybackSessionId> {
        self.active
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    pub fn notification_visible(&self) -> bool {
        self.notification_visible
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            is_active: self.is_active(),
            notification_visible: self.notification_visible,
            session_id: self.active,
            record: self.record.clone(),
        }
    }

    pub fn apply(&mut self, trigger: SessionTrigger) -> Vec<SessionEffect> {
        match trigger {
            SessionTrigger::Start {
                request,
                accepted_at,
            } => self.on_start(request, accepted_at),
            SessionTrigger::RendererReady { session } => self.on_ready(session),
            SessionTrigger::RendererError { session, message } => self.on_error(session, message),
            SessionTrigger::PlaybackCompleted { session } => self.on_completed(session),
            SessionTrigger::Stop => self.teardown(StopReason::Requested),
            SessionTrigger::Shutdown => self.teardown(StopReason::Shutdown),
            SessionTrigger::NotificationTapped => self.on_tap(),
        }
    }

    fn on_start(&mut self, request: ResolvedStart, accepted_at: i64) -> Vec<SessionEffect> {
        if self.state != SessionState::Idle {
            debug!(state = ?self.state, "start ignored, session already active");
            return Vec::new();
        }

        self.record = Some(SessionRecord {
            stream_url: request.url.clone().unwrap_or_default(),
            looping: request.looping,
            notification: NotificationMetadata {
                title: request.title.clone(),
                body: request.body.clone(),
                created_at: accepted_at,
            },
        });
        self.notification_visible = true;

        let mut effects = vec![SessionEffect::PresentNotification {
            title: request.title.clone(),
            body: request.body,
            icon: request.icon,
        }];

        match request.url {
            Some(url) => {
                let session = PlaybackSessionId::new();
                self.active = Some(session);
                self.state = SessionState::Starting;
                effects.push(SessionEffect::Publish(SessionEvent::Starting {
                    session_id: session.to_string(),
                    title: request.title,
                    url: redact_url(&url),
                    looping: request.looping,
                }));
                effects.push(SessionEffect::PrepareRenderer {
                    session,
                    url,
                    looping: request.looping,
                });
            }
            None => {
                effects.push(SessionEffect::Publish(SessionEvent::NotificationShown {
                    title: request.title,
                }));
            }
        }

        effects
    }

    fn on_ready(&mut self, session: PlaybackSessionId) -> Vec<SessionEffect> {
        if self.state != SessionState::Starting || self.active != Some(session) {
            debug!(%session, state = ?self.state, "stale renderer ready ignored");
            return Vec::new();
        }

        self.state = SessionState::Playing;
        vec![
            SessionEffect::StartRenderer { session },
            SessionEffect::Publish(SessionEvent::Playing {
                session_id: session.to_string(),
            }),
        ]
    }

    fn on_error(&mut self, session: PlaybackSessionId, message: String) -> Vec<SessionEffect> {
        if self.active != Some(session) {
            debug!(%session, "renderer error for inactive session ignored");
            return Vec::new();
        }

        let mut effects = self.release_all();
        effects.push(SessionEffect::Publish(SessionEvent::Failed {
            session_id: session.to_string(),
            message,
        }));
        effects
    }

    fn on_completed(&mut self, session: PlaybackSessionId) -> Vec<SessionEffect> {
        if self.state != SessionState::Playing || self.active != Some(session) {
            debug!(%session, state = ?self.state, "completion for inactive session ignored");
            return Vec::new();
        }

        let looping = self.record.as_ref().map_or(false, |record| record.looping);
        if looping {
            // Host restarts looping streams itself.
            return Vec::new();
        }

        let mut effects = self.release_all();
        effects.push(SessionEffect::Publish(SessionEvent::Stopped {
            session_id: Some(session.to_string()),
            reason: StopReason::Completed,
        }));
        effects
    }

    fn on_tap(&mut self) -> Vec<SessionEffect> {
        let record = match (&self.record, self.notification_visible) {
            (Some(record), true) => record.clone(),
            _ => {
                debug!("tap without a visible notification ignored");
                return Vec::new();
            }
        };

        let session = self.active;
        let tap = TapEvent::from(&record);
        let mut effects = vec![SessionEffect::EmitTap(tap.clone())];
        effects.extend(self.release_all());
        effects.push(SessionEffect::Publish(SessionEvent::Tapped {
            timestamp: tap.timestamp,
            title: tap.title,
        }));
        effects.push(SessionEffect::Publish(SessionEvent::Stopped {
            session_id: session.map(|id| id.to_string()),
            reason: StopReason::Tapped,
        }));
        effects
    }

    /// Stop and shutdown are unconditional: the notification withdrawal is
    /// requested even when nothing is tracked as visible.
    fn teardown(&mut self, reason: StopReason) -> Vec<SessionEffect> {
        let session = self.active;
        let mut effects = self.release_all();
        if !effects.contains(&SessionEffect::WithdrawNotification) {
            effects.push(SessionEffect::WithdrawNotification);
        }
        effects.push(SessionEffect::Publish(SessionEvent::Stopped {
            session_id: session.map(|id| id.to_string()),
            reason,
        }));
        effects
    }

    fn release_all(&mut self) -> Vec<SessionEffect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(session) = self.active.take() {
            effects.push(SessionEffect::ReleaseRenderer { session });
        }
        if self.notification_visible {
            self.notification_visible = false;
            effects.push(SessionEffect::WithdrawNotification);
        }
        self.state = SessionState::Idle;
        effects
    }
}
