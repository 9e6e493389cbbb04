//! Session lifecycle tests against recording fakes
//!
//! This test suite verifies:
//! - Start idempotency and metadata capture
//! - Completion, error, stop and tap teardown paths
//! - Renderer signal delivery through the listener pump
//! - Stale signals after cancellation

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AudioRenderer, Clock, NotificationChannelSpec, NotificationContent, NotificationPresenter,
    NotificationPriority, PlaybackSessionId, RendererListener, RendererRequest, RendererSignal,
};
use chrono::{DateTime, Utc};
use core_playback::{
    PlaybackError, PlaybackSession, SessionDependencies, SessionState, StartRequest, TapEvent,
    TapHandler,
};
use core_runtime::config::AlertConfig;
use core_runtime::events::{CoreEvent, Receiver, SessionEvent, StopReason};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum PresenterCall {
    EnsureChannel(String),
    Present(NotificationContent),
    Withdraw(i32),
}

#[derive(Default)]
struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
    withdraw_delay: Option<Duration>,
}

impl RecordingPresenter {
    fn slow_withdraw(delay: Duration) -> Self {
        Self {
            withdraw_delay: Some(delay),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    fn withdraw_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PresenterCall::Withdraw(_)))
            .count()
    }
}

#[async_trait]
impl NotificationPresenter for RecordingPresenter {
    async fn ensure_channel(&self, channel: &NotificationChannelSpec) -> BridgeResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(PresenterCall::EnsureChannel(channel.id.clone()));
        Ok(())
    }

    async fn present(&self, content: &NotificationContent) -> BridgeResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(PresenterCall::Present(content.clone()));
        Ok(())
    }

    async fn withdraw(&self, notification_id: i32) -> BridgeResult<()> {
        if let Some(delay) = self.withdraw_delay {
            tokio::time::sleep(delay).await;
        }
        self.calls
            .lock()
            .unwrap()
            .push(PresenterCall::Withdraw(notification_id));
        Ok(())
    }
}

#[derive(Default)]
struct FakeRenderer {
    prepared: Mutex<Vec<RendererRequest>>,
    listeners: Mutex<Vec<Arc<dyn RendererListener>>>,
    started: Mutex<Vec<PlaybackSessionId>>,
    released: Mutex<Vec<PlaybackSessionId>>,
    reject_prepare: bool,
    reject_start: bool,
    ready_inside_prepare: bool,
}

impl FakeRenderer {
    fn rejecting() -> Self {
        Self {
            reject_prepare: true,
            ..Default::default()
        }
    }

    fn failing_start() -> Self {
        Self {
            reject_start: true,
            ..Default::default()
        }
    }

    fn eager() -> Self {
        Self {
            ready_inside_prepare: true,
            ..Default::default()
        }
    }

    fn last_session(&self) -> PlaybackSessionId {
        self.prepared.lock().unwrap().last().unwrap().session
    }

    fn last_listener(&self) -> Arc<dyn RendererListener> {
        Arc::clone(self.listeners.lock().unwrap().last().unwrap())
    }

    fn prepare_count(&self) -> usize {
        self.prepared.lock().unwrap().len()
    }

    fn started(&self) -> Vec<PlaybackSessionId> {
        self.started.lock().unwrap().clone()
    }

    fn released(&self) -> Vec<PlaybackSessionId> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioRenderer for FakeRenderer {
    async fn prepare(
        &self,
        request: RendererRequest,
        listener: Arc<dyn RendererListener>,
    ) -> BridgeResult<()> {
        if self.reject_prepare {
            return Err(BridgeError::InvalidSource(request.url));
        }
        let session = request.session;
        self.prepared.lock().unwrap().push(request);
        self.listeners.lock().unwrap().push(Arc::clone(&listener));
        if self.ready_inside_prepare {
            listener.on_signal(session, RendererSignal::Ready);
        }
        Ok(())
    }

    async fn start(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        if self.reject_start {
            return Err(BridgeError::OperationFailed("audio device busy".into()));
        }
        self.started.lock().unwrap().push(session);
        Ok(())
    }

    async fn release(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        self.released.lock().unwrap().push(session);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingTaps {
    taps: Mutex<Vec<TapEvent>>,
}

impl RecordingTaps {
    fn taps(&self) -> Vec<TapEvent> {
        self.taps.lock().unwrap().clone()
    }
}

#[async_trait]
impl TapHandler for RecordingTaps {
    async fn on_tap(&self, event: TapEvent) {
        self.taps.lock().unwrap().push(event);
    }
}

struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    fn at(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap()
    }
}

struct Harness {
    session: PlaybackSession,
    presenter: Arc<RecordingPresenter>,
    renderer: Arc<FakeRenderer>,
    taps: Arc<RecordingTaps>,
    clock: Arc<ManualClock>,
}

fn harness_with(renderer: FakeRenderer) -> Harness {
    harness_from(RecordingPresenter::default(), renderer)
}

fn harness_from(presenter: RecordingPresenter, renderer: FakeRenderer) -> Harness {
    let presenter = Arc::new(presenter);
    let renderer = Arc::new(renderer);
    let taps = Arc::new(RecordingTaps::default());
    let clock = Arc::new(ManualClock::at(1_000));

    let session = PlaybackSession::new(
        AlertConfig::default(),
        SessionDependencies {
            presenter: presenter.clone(),
            renderer: renderer.clone(),
            tap_handler: taps.clone(),
            clock: clock.clone(),
        },
    )
    .unwrap();

    Harness {
        session,
        presenter,
        renderer,
        taps,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(FakeRenderer::default())
}

async fn wait_for<F>(rx: &mut Receiver<CoreEvent>, predicate: F) -> SessionEvent
where
    F: Fn(&SessionEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let CoreEvent::Session(event) = rx.recv().await.unwrap();
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_start_while_playing_keeps_first_session() {
    let h = harness();
    h.session
        .start(StartRequest::new("a.mp3").with_title("First").with_body("One"))
        .await
        .unwrap();
    let session = h.renderer.last_session();
    h.session
        .handle_renderer_signal(session, RendererSignal::Ready)
        .await;

    h.clock.set(9_999);
    h.session
        .start(StartRequest::new("b.mp3").with_title("Second").with_body("Two"))
        .await
        .unwrap();

    let snapshot = h.session.snapshot().await;
    let record = snapshot.record.unwrap();
    assert_eq!(snapshot.state, SessionState::Playing);
    assert_eq!(record.stream_url, "a.mp3");
    assert_eq!(record.notification.title, "First");
    assert_eq!(record.notification.body, "One");
    assert_eq!(record.notification.created_at, 1_000);
    assert_eq!(h.renderer.prepare_count(), 1);
}

#[tokio::test]
async fn test_full_lifecycle_withdraws_once() {
    let h = harness();
    h.session
        .start(
            StartRequest::new("a.mp3")
                .with_title("T")
                .with_body("B")
                .with_loop(false),
        )
        .await
        .unwrap();
    let session = h.renderer.last_session();

    h.session
        .handle_renderer_signal(session, RendererSignal::Ready)
        .await;
    assert_eq!(h.session.snapshot().await.state, SessionState::Playing);
    assert_eq!(h.renderer.started(), vec![session]);

    h.session
        .handle_renderer_signal(session, RendererSignal::Completed)
        .await;

    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(!snapshot.is_active);
    assert!(!snapshot.notification_visible);
    assert_eq!(h.presenter.withdraw_count(), 1);
    assert_eq!(h.renderer.released(), vec![session]);
}

#[tokio::test]
async fn test_looping_completion_keeps_playing() {
    let h = harness();
    h.session
        .start(StartRequest::new("loop.mp3").with_loop(true))
        .await
        .unwrap();
    let session = h.renderer.last_session();
    h.session
        .handle_renderer_signal(session, RendererSignal::Ready)
        .await;

    h.session
        .handle_renderer_signal(session, RendererSignal::Completed)
        .await;

    assert_eq!(h.session.snapshot().await.state, SessionState::Playing);
    assert_eq!(h.presenter.withdraw_count(), 0);
    assert!(h.renderer.released().is_empty());
}

#[tokio::test]
async fn test_stop_when_idle_is_safe() {
    let h = harness();

    h.session.stop().await;
    h.session.stop().await;

    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(h.renderer.released().is_empty());
    // Lingering notifications are still withdrawn
    assert_eq!(h.presenter.withdraw_count(), 2);
}

#[tokio::test]
async fn test_late_ready_after_stop_is_ignored() {
    let h = harness();
    h.session.start(StartRequest::new("slow.mp3")).await.unwrap();
    let session = h.renderer.last_session();
    h.session.stop().await;

    h.session
        .handle_renderer_signal(session, RendererSignal::Ready)
        .await;

    assert_eq!(h.session.snapshot().await.state, SessionState::Idle);
    assert!(h.renderer.started().is_empty());
    assert_eq!(h.renderer.released(), vec![session]);
}

#[tokio::test]
async fn test_renderer_error_returns_to_idle() {
    let h = harness();
    let mut rx = h.session.subscribe();
    h.session
        .start(StartRequest::new("https://dead.example/a.mp3"))
        .await
        .unwrap();
    let session = h.renderer.last_session();

    h.renderer.last_listener().on_signal(
        session,
        RendererSignal::Error {
            message: "HTTP 404".into(),
        },
    );

    let failed = wait_for(&mut rx, |e| matches!(e, SessionEvent::Failed { .. })).await;
    assert_eq!(
        failed,
        SessionEvent::Failed {
            session_id: session.to_string(),
            message: "HTTP 404".into(),
        }
    );
    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(!snapshot.notification_visible);
    assert_eq!(h.presenter.withdraw_count(), 1);
}

#[tokio::test]
async fn test_prepare_rejection_withdraws_notification() {
    let h = harness_with(FakeRenderer::rejecting());

    h.session.start(StartRequest::new("not a url")).await.unwrap();

    let calls = h.presenter.calls();
    assert!(matches!(calls[1], PresenterCall::Present(_)));
    assert_eq!(calls.last(), Some(&PresenterCall::Withdraw(888)));
    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(!snapshot.is_active);
    assert_eq!(h.renderer.released().len(), 1);
}

#[tokio::test]
async fn test_renderer_start_failure_never_reports_playing() {
    let h = harness_with(FakeRenderer::failing_start());
    let mut rx = h.session.subscribe();
    h.session.start(StartRequest::new("a.mp3")).await.unwrap();
    let session = h.renderer.last_session();

    h.session
        .handle_renderer_signal(session, RendererSignal::Ready)
        .await;

    let mut seen = Vec::new();
    while let Ok(CoreEvent::Session(event)) = rx.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.len(), 2, "unexpected events: {seen:?}");
    assert!(matches!(seen[0], SessionEvent::Starting { .. }));
    assert_eq!(
        seen[1],
        SessionEvent::Failed {
            session_id: session.to_string(),
            message: "Bridge operation failed: audio device busy".into(),
        }
    );
    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(!snapshot.notification_visible);
    assert_eq!(h.renderer.released(), vec![session]);
}

// ============================================================================
// Tap correlation
// ============================================================================

#[tokio::test]
async fn test_tap_reports_recorded_metadata() {
    let h = harness();
    h.clock.set(1_700_000_000_000);
    h.session
        .start(StartRequest::new("x.mp3").with_title("Title1").with_body("Body1"))
        .await
        .unwrap();
    let session = h.renderer.last_session();

    h.clock.set(1_700_000_999_000);
    h.session.notification_tapped().await;

    assert_eq!(
        h.taps.taps(),
        vec![TapEvent {
            timestamp: 1_700_000_000_000,
            title: "Title1".into(),
            body: "Body1".into(),
            url: "x.mp3".into(),
        }]
    );
    assert_eq!(h.session.snapshot().await.state, SessionState::Idle);
    assert_eq!(h.renderer.released(), vec![session]);
    assert_eq!(h.presenter.withdraw_count(), 1);

    // Exactly once per tap
    h.session.notification_tapped().await;
    assert_eq!(h.taps.taps().len(), 1);
}

#[tokio::test]
async fn test_tap_reflects_newest_session() {
    let h = harness();
    h.session
        .start(StartRequest::new("old.mp3").with_title("Old").with_body("Old body"))
        .await
        .unwrap();
    let old = h.renderer.last_session();
    h.session
        .handle_renderer_signal(
            old,
            RendererSignal::Error {
                message: "decode".into(),
            },
        )
        .await;

    h.clock.set(2_000);
    h.session
        .start(StartRequest::new("new.mp3").with_title("New").with_body("New body"))
        .await
        .unwrap();
    h.session.notification_tapped().await;

    let taps = h.taps.taps();
    assert_eq!(taps.len(), 1);
    assert_eq!(taps[0].title, "New");
    assert_eq!(taps[0].body, "New body");
    assert_eq!(taps[0].url, "new.mp3");
    assert_eq!(taps[0].timestamp, 2_000);
}

#[tokio::test]
async fn test_notification_only_start_and_tap() {
    let h = harness();
    h.session
        .start(StartRequest::default().with_title("Heads up"))
        .await
        .unwrap();

    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(!snapshot.is_active);
    assert!(snapshot.notification_visible);
    assert_eq!(h.renderer.prepare_count(), 0);

    h.session.notification_tapped().await;
    let taps = h.taps.taps();
    assert_eq!(taps[0].url, "");
    assert_eq!(taps[0].body, "Playing audio...");
    assert_eq!(h.presenter.withdraw_count(), 1);
}

struct StopOnTap {
    session: OnceLock<PlaybackSession>,
    taps: Mutex<usize>,
}

#[async_trait]
impl TapHandler for StopOnTap {
    async fn on_tap(&self, _event: TapEvent) {
        *self.taps.lock().unwrap() += 1;
        if let Some(session) = self.session.get() {
            session.stop().await;
        }
    }
}

#[tokio::test]
async fn test_tap_handler_may_reenter_session() {
    let handler = Arc::new(StopOnTap {
        session: OnceLock::new(),
        taps: Mutex::new(0),
    });
    let session = PlaybackSession::new(
        AlertConfig::default(),
        SessionDependencies {
            presenter: Arc::new(RecordingPresenter::default()),
            renderer: Arc::new(FakeRenderer::default()),
            tap_handler: handler.clone(),
            clock: Arc::new(ManualClock::at(5)),
        },
    )
    .unwrap();
    handler.session.set(session.clone()).unwrap();

    session.start(StartRequest::new("a.mp3")).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), session.notification_tapped())
        .await
        .expect("tap handler deadlocked");

    assert_eq!(*handler.taps.lock().unwrap(), 1);
    assert_eq!(session.snapshot().await.state, SessionState::Idle);
}

// ============================================================================
// Signal pump
// ============================================================================

#[tokio::test]
async fn test_listener_signals_reach_session() {
    let h = harness();
    let mut rx = h.session.subscribe();
    h.session.start(StartRequest::new("a.mp3")).await.unwrap();
    let session = h.renderer.last_session();

    h.renderer
        .last_listener()
        .on_signal(session, RendererSignal::Ready);

    wait_for(&mut rx, |e| matches!(e, SessionEvent::Playing { .. })).await;
    assert_eq!(h.renderer.started(), vec![session]);
}

#[tokio::test]
async fn test_externally_wired_listener_reaches_session() {
    let h = harness();
    let mut rx = h.session.subscribe();
    h.session.start(StartRequest::new("a.mp3")).await.unwrap();
    let session = h.renderer.last_session();

    // A host player that registered its callbacks before the session existed
    let listener = h.session.renderer_listener();
    listener.on_signal(PlaybackSessionId::new(), RendererSignal::Ready);
    listener.on_signal(session, RendererSignal::Ready);

    let playing = wait_for(&mut rx, |e| matches!(e, SessionEvent::Playing { .. })).await;
    assert_eq!(
        playing,
        SessionEvent::Playing {
            session_id: session.to_string(),
        }
    );
    assert_eq!(h.renderer.started(), vec![session]);
}

#[tokio::test]
async fn test_ready_inside_prepare_does_not_deadlock() {
    let h = harness_with(FakeRenderer::eager());
    let mut rx = h.session.subscribe();

    h.session.start(StartRequest::new("fast.mp3")).await.unwrap();

    wait_for(&mut rx, |e| matches!(e, SessionEvent::Playing { .. })).await;
    assert_eq!(h.session.snapshot().await.state, SessionState::Playing);
}

// ============================================================================
// Presentation, shutdown and construction
// ============================================================================

#[tokio::test]
async fn test_notification_content_follows_config() {
    let h = harness();
    h.session
        .start(StartRequest::new("a.mp3").with_icon("ic_alarm"))
        .await
        .unwrap();
    h.session.stop().await;
    h.session.start(StartRequest::new("b.mp3")).await.unwrap();

    let calls = h.presenter.calls();
    let channel_calls = calls
        .iter()
        .filter(|call| matches!(call, PresenterCall::EnsureChannel(_)))
        .count();
    assert_eq!(channel_calls, 1);
    assert_eq!(
        calls[0],
        PresenterCall::EnsureChannel("generic_audio_alert_channel".into())
    );

    let PresenterCall::Present(content) = &calls[1] else {
        panic!("expected present, got {:?}", calls[1]);
    };
    assert_eq!(content.id, 888);
    assert_eq!(content.title, "Alert");
    assert_eq!(content.body, "Playing audio...");
    assert_eq!(content.priority, NotificationPriority::Max);
    assert!(content.ongoing);
    assert_eq!(
        content.icon,
        bridge_traits::NotificationIcon::Named("ic_alarm".into())
    );
}

#[tokio::test]
async fn test_shutdown_tears_down_and_rejects_starts() {
    let h = harness();
    let mut rx = h.session.subscribe();
    h.session.start(StartRequest::new("a.mp3")).await.unwrap();
    let session = h.renderer.last_session();

    h.session.shutdown().await;
    h.session.shutdown().await;

    let stopped = wait_for(&mut rx, |e| matches!(e, SessionEvent::Stopped { .. })).await;
    assert_eq!(
        stopped,
        SessionEvent::Stopped {
            session_id: Some(session.to_string()),
            reason: StopReason::Shutdown,
        }
    );
    assert!(h.session.is_shut_down());
    assert_eq!(h.renderer.released(), vec![session]);

    let result = h.session.start(StartRequest::new("b.mp3")).await;
    assert!(matches!(result, Err(PlaybackError::SessionClosed)));
    assert_eq!(h.renderer.prepare_count(), 1);
    assert_eq!(h.session.snapshot().await.state, SessionState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_racing_shutdown_is_rejected() {
    let h = harness_from(
        RecordingPresenter::slow_withdraw(Duration::from_millis(200)),
        FakeRenderer::default(),
    );

    let closing = h.session.clone();
    let shutdown = tokio::spawn(async move { closing.shutdown().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Waits on the lock held by the shutdown teardown
    let result = h.session.start(StartRequest::new("https://x/a.mp3")).await;
    shutdown.await.unwrap();

    assert!(matches!(result, Err(PlaybackError::SessionClosed)));
    let snapshot = h.session.snapshot().await;
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(!snapshot.is_active);
    assert!(!snapshot.notification_visible);
    assert_eq!(h.renderer.prepare_count(), 0);
    assert!(h.session.is_shut_down());
}

#[test]
fn test_new_outside_runtime_fails() {
    let result = PlaybackSession::new(
        AlertConfig::default(),
        SessionDependencies {
            presenter: Arc::new(RecordingPresenter::default()),
            renderer: Arc::new(FakeRenderer::default()),
            tap_handler: Arc::new(RecordingTaps::default()),
            clock: Arc::new(ManualClock::at(0)),
        },
    );

    assert!(matches!(result, Err(PlaybackError::RuntimeUnavailable(_))));
}
