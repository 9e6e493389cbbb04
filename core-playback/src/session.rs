//! # Playback Session
//!
//! Owns the [`SessionMachine`] and the host collaborators it drives. Every
//! inbound event (start, stop, tap, renderer signal) is applied to the
//! machine under one async mutex, and the resulting bridge calls are made
//! before the lock is released, so transitions never interleave.
//!
//! Renderer signals are not applied on the caller's thread. The listener
//! handed to [`AudioRenderer::prepare`] only enqueues them; a pump task
//! drains the queue into the session. A renderer may therefore report
//! `Ready` from inside `prepare` without deadlocking.
//!
//! Tap delivery and lifecycle events are dispatched after the lock is
//! released, so a tap handler may call straight back into the session.
//!
//! Shutdown marks the locked state closed in the same critical section that
//! tears the session down. Anything that acquires the lock afterwards is
//! rejected, including a start that raced the shutdown.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use bridge_traits::{
    AudioRenderer, Clock, NotificationContent, NotificationIcon, NotificationPresenter,
    PlaybackSessionId, RendererListener, RendererRequest, RendererSignal,
};
use core_runtime::config::AlertConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver, SessionEvent};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{PlaybackError, Result};
use crate::machine::{
    SessionEffect, SessionMachine, SessionSnapshot, SessionTrigger, TapEvent,
};
use crate::request::StartRequest;

/// Receives tap events on behalf of the application layer.
#[async_trait]
pub trait TapHandler: Send + Sync {
    async fn on_tap(&self, event: TapEvent);
}

/// Host collaborators required by a [`PlaybackSession`].
#[derive(Clone)]
pub struct SessionDependencies {
    pub presenter: Arc<dyn NotificationPresenter>,
    pub renderer: Arc<dyn AudioRenderer>,
    pub tap_handler: Arc<dyn TapHandler>,
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDependencies")
            .field("presenter", &"NotificationPresenter { ... }")
            .field("renderer", &"AudioRenderer { ... }")
            .field("tap_handler", &"TapHandler { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

type SignalMessage = (PlaybackSessionId, RendererSignal);

struct SignalForwarder {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

impl RendererListener for SignalForwarder {
    fn on_signal(&self, session: PlaybackSessionId, signal: RendererSignal) {
        if self.tx.send((session, signal)).is_err() {
            debug!(%session, "renderer signal dropped, session closed");
        }
    }
}

struct LockedState {
    machine: SessionMachine,
    channel_ready: bool,
    closed: bool,
}

struct SessionInner {
    state: Mutex<LockedState>,
    config: AlertConfig,
    deps: SessionDependencies,
    events: EventBus,
    listener: Arc<dyn RendererListener>,
    shutdown: CancellationToken,
}

enum Outbound {
    Tap(TapEvent),
    Event(SessionEvent),
}

/// The single background playback session.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Arc<SessionInner>,
}

impl PlaybackSession {
    /// Create the session and spawn its renderer signal pump on the current
    /// Tokio runtime.
    pub fn new(config: AlertConfig, deps: SessionDependencies) -> Result<Self> {
        config.validate()?;
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::RuntimeUnavailable(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(SessionInner {
            state: Mutex::new(LockedState {
                machine: SessionMachine::new(),
                channel_ready: false,
                closed: false,
            }),
            events: EventBus::new(config.event_buffer_size),
            config,
            deps,
            listener: Arc::new(SignalForwarder { tx }),
            shutdown: CancellationToken::new(),
        });

        handle.spawn(pump_signals(
            Arc::downgrade(&inner),
            rx,
            inner.shutdown.clone(),
        ));

        Ok(Self { inner })
    }

    /// Request background playback with a persistent notification.
    ///
    /// Returns once the notification is up and the renderer is preparing.
    /// Ignored while a session is starting or playing. Renderer failures are
    /// absorbed; the session simply returns to idle.
    ///
    /// Fails with [`PlaybackError::SessionClosed`] after [`shutdown`].
    ///
    /// [`shutdown`]: PlaybackSession::shutdown
    #[instrument(skip_all)]
    pub async fn start(&self, request: StartRequest) -> Result<()> {
        let resolved = request.resolve(&self.inner.config.defaults);
        let accepted_at = self.inner.deps.clock.unix_timestamp_millis();
        self.inner
            .apply(SessionTrigger::Start {
                request: resolved,
                accepted_at,
            })
            .await
    }

    /// Stop playback and withdraw the notification. Safe in any state.
    #[instrument(skip_all)]
    pub async fn stop(&self) {
        self.inner.apply_or_log(SessionTrigger::Stop).await;
    }

    /// The user tapped the notification.
    #[instrument(skip_all)]
    pub async fn notification_tapped(&self) {
        self.inner
            .apply_or_log(SessionTrigger::NotificationTapped)
            .await;
    }

    /// Apply a renderer signal directly, bypassing the pump. For hosts that
    /// already serialise their callbacks.
    pub async fn handle_renderer_signal(&self, session: PlaybackSessionId, signal: RendererSignal) {
        self.inner.apply_or_log(signal_trigger(session, signal)).await;
    }

    /// Listener to hand to a renderer outside of [`PlaybackSession::start`],
    /// e.g. a host player that keeps its own callback registration.
    /// Signals go through the same pump as those from `prepare`.
    pub fn renderer_listener(&self) -> Arc<dyn RendererListener> {
        Arc::clone(&self.inner.listener)
    }

    /// Tear down any active session and stop the signal pump. Idempotent.
    pub async fn shutdown(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        info!("playback session shutting down");
        self.inner.apply_or_log(SessionTrigger::Shutdown).await;
        self.inner.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().await.machine.snapshot()
    }

    /// Lifecycle events for diagnostics.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    pub fn config(&self) -> &AlertConfig {
        &self.inner.config
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("shut_down", &self.is_shut_down())
            .field("events", &self.inner.events)
            .finish()
    }
}

fn signal_trigger(session: PlaybackSessionId, signal: RendererSignal) -> SessionTrigger {
    match signal {
        RendererSignal::Ready => SessionTrigger::RendererReady { session },
        RendererSignal::Error { message } => SessionTrigger::RendererError { session, message },
        RendererSignal::Completed => SessionTrigger::PlaybackCompleted { session },
    }
}

async fn pump_signals(
    inner: Weak<SessionInner>,
    mut rx: mpsc::UnboundedReceiver<SignalMessage>,
    shutdown: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = rx.recv() => next,
        };

        let Some((session, signal)) = next else {
            break;
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.apply_or_log(signal_trigger(session, signal)).await;
    }
    debug!("renderer signal pump stopped");
}

impl SessionInner {
    async fn apply_or_log(&self, trigger: SessionTrigger) {
        if let Err(err) = self.apply(trigger).await {
            debug!(error = %err, "trigger ignored");
        }
    }

    async fn apply(&self, trigger: SessionTrigger) -> Result<()> {
        let mut outbound = Vec::new();
        {
            let mut guard = self.state.lock().await;
            if guard.closed {
                if matches!(trigger, SessionTrigger::Start { .. }) {
                    warn!("start requested after shutdown, ignoring");
                }
                return Err(PlaybackError::SessionClosed);
            }
            if matches!(trigger, SessionTrigger::Shutdown) {
                guard.closed = true;
            }
            let mut queue: VecDeque<SessionEffect> = guard.machine.apply(trigger).into();

            while let Some(effect) = queue.pop_front() {
                match effect {
                    SessionEffect::PresentNotification { title, body, icon } => {
                        if !guard.channel_ready {
                            guard.channel_ready = self.ensure_channel().await;
                        }
                        self.present(title, body, icon).await;
                    }
                    SessionEffect::WithdrawNotification => self.withdraw().await,
                    SessionEffect::PrepareRenderer {
                        session,
                        url,
                        looping,
                    } => {
                        if let Err(message) = self.prepare(session, url, looping).await {
                            queue.extend(
                                guard
                                    .machine
                                    .apply(SessionTrigger::RendererError { session, message }),
                            );
                        }
                    }
                    SessionEffect::StartRenderer { session } => {
                        if let Err(err) = self.deps.renderer.start(session).await {
                            warn!(%session, error = %err, "renderer failed to start");
                            // Never reached Playing as far as observers go
                            let id = session.to_string();
                            queue.retain(|effect| {
                                !matches!(
                                    effect,
                                    SessionEffect::Publish(SessionEvent::Playing { session_id })
                                        if *session_id == id
                                )
                            });
                            queue.extend(guard.machine.apply(SessionTrigger::RendererError {
                                session,
                                message: err.to_string(),
                            }));
                        }
                    }
                    SessionEffect::ReleaseRenderer { session } => {
                        if let Err(err) = self.deps.renderer.release(session).await {
                            error!(%session, error = %err, "renderer release failed");
                        }
                    }
                    SessionEffect::EmitTap(tap) => outbound.push(Outbound::Tap(tap)),
                    SessionEffect::Publish(event) => outbound.push(Outbound::Event(event)),
                }
            }
        }

        for item in outbound {
            match item {
                Outbound::Tap(tap) => {
                    info!(title = %tap.title, created_at = tap.timestamp, "notification tapped");
                    self.deps.tap_handler.on_tap(tap).await;
                }
                Outbound::Event(event) => {
                    // No subscribers is the normal case
                    let _ = self.events.emit(CoreEvent::Session(event));
                }
            }
        }
        Ok(())
    }

    async fn ensure_channel(&self) -> bool {
        match self
            .deps
            .presenter
            .ensure_channel(&self.config.notification_channel)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                error!(
                    channel = %self.config.notification_channel.id,
                    error = %err,
                    "failed to create notification channel"
                );
                false
            }
        }
    }

    async fn present(&self, title: String, body: String, icon: NotificationIcon) {
        let settings = &self.config.notification;
        let content = NotificationContent {
            id: settings.id,
            channel_id: self.config.notification_channel.id.clone(),
            title,
            body,
            icon,
            ongoing: settings.ongoing,
            priority: settings.priority,
            category: settings.category,
            open_app_on_tap: settings.open_app_on_tap,
        };

        match self.deps.presenter.present(&content).await {
            Ok(()) => info!(notification_id = content.id, title = %content.title, "notification presented"),
            Err(err) => error!(notification_id = content.id, error = %err, "failed to present notification"),
        }
    }

    async fn withdraw(&self) {
        let id = self.config.notification.id;
        if let Err(err) = self.deps.presenter.withdraw(id).await {
            error!(notification_id = id, error = %err, "failed to withdraw notification");
        }
    }

    async fn prepare(
        &self,
        session: PlaybackSessionId,
        url: String,
        looping: bool,
    ) -> std::result::Result<(), String> {
        let request = RendererRequest {
            session,
            url,
            looping,
            attributes: self.config.audio_attributes,
        };
        let redacted = core_runtime::logging::redact_url(&request.url);

        match self
            .deps
            .renderer
            .prepare(request, Arc::clone(&self.listener))
            .await
        {
            Ok(()) => {
                info!(%session, url = %redacted, looping, "renderer preparing");
                Ok(())
            }
            Err(err) => {
                warn!(%session, url = %redacted, error = %err, "renderer rejected source");
                Err(err.to_string())
            }
        }
    }
}
