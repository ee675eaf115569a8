//! Monitor controller loop
//!
//! One tokio task owns every piece of mutable monitor state (identity,
//! gates, idle watermark, lifecycle phase) and drives it from timers and
//! a command channel. Backend calls never block the loop: they are
//! spawned, and their completions come back as internal events whose side
//! effects are gated on the `started` flag — a response that lands after
//! `stop()` is observed but not acted on.

use crate::overlay::StatusSink;
use crate::settings::Settings;
use alerting::{AlertSink, DrowsyAlertGate};
use backend_client::{
    BackendClient, BackendError, IdentifyResponse, InferResponse, SessionRequest, SignalKind,
};
use engagement::{Identity, IdentifyGate, InferGate, InferenceResult};
use frame_capture::{
    select_source, CaptureError, FrameProcessor, FrameSource, SourceKind, SourceProvider,
};
use lifecycle::{CallProbe, LifecycleAction, LifecycleController, StartIntentStore};
use std::sync::Arc;
use telemetry::{EventReporter, IdleWatermark, SessionTracker, VerifiedLedger};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// External inputs to the controller
#[derive(Debug, Clone)]
pub enum Command {
    /// Begin capture (manual overlay button or lifecycle)
    Start,
    /// End capture
    Stop,
    /// User activity observed; resets the idle counter
    Activity,
    /// Tab visibility changed
    Visibility { visible: bool },
    /// A control in the host UI was clicked
    UiClick { label: String },
    /// The page is being torn down
    PageUnload,
}

/// Completions of spawned backend calls
enum Completion {
    Identify(Result<IdentifyResponse, BackendError>),
    Infer(Result<InferResponse, BackendError>),
}

/// Handle for feeding commands to a running controller
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
}

impl MonitorHandle {
    pub async fn send(&self, cmd: Command) {
        if self.tx.send(cmd).await.is_err() {
            warn!("Monitor controller is gone");
        }
    }

    pub async fn start(&self) {
        self.send(Command::Start).await;
    }

    pub async fn stop(&self) {
        self.send(Command::Stop).await;
    }

    /// Tear the controller task down
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// The controller task. Constructed once per page visit, then `run` to
/// completion.
pub struct MonitorController {
    settings: Settings,
    backend: Arc<dyn BackendClient>,
    provider: Box<dyn SourceProvider>,
    probe: Box<dyn CallProbe>,
    intent_store: Box<dyn StartIntentStore>,
    overlay: Box<dyn StatusSink>,
    alert_sink: Box<dyn AlertSink>,

    processor: FrameProcessor,
    session: Arc<SessionTracker>,
    reporter: Arc<EventReporter>,

    started: bool,
    source: Option<Box<dyn FrameSource>>,
    identity: Option<Identity>,
    identify_gate: IdentifyGate,
    infer_gate: InferGate,
    alert_gate: DrowsyAlertGate,
    idle: IdleWatermark,
    verified: VerifiedLedger,
    lifecycle: LifecycleController,
    last_state_shown: Option<String>,

    cmd_rx: mpsc::Receiver<Command>,
    done_tx: mpsc::Sender<Completion>,
    done_rx: mpsc::Receiver<Completion>,
    cancel: CancellationToken,
}

impl MonitorController {
    pub fn new(
        settings: Settings,
        backend: Arc<dyn BackendClient>,
        provider: Box<dyn SourceProvider>,
        probe: Box<dyn CallProbe>,
        intent_store: Box<dyn StartIntentStore>,
        overlay: Box<dyn StatusSink>,
        alert_sink: Box<dyn AlertSink>,
    ) -> (Self, MonitorHandle) {
        let session = Arc::new(SessionTracker::new(
            backend.clone(),
            SessionRequest {
                course_id: settings.session.course_id.clone(),
                meet_url: settings.session.meet_url.clone(),
                title: settings.session.title.clone(),
            },
        ));
        let reporter = Arc::new(EventReporter::new(
            backend.clone(),
            session.clone(),
            settings.session.course_id.clone(),
            settings.session.camera_id.clone(),
        ));

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (done_tx, done_rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        let controller = Self {
            processor: FrameProcessor::new(&settings.capture.frame_config()),
            identify_gate: IdentifyGate::new(
                Duration::from_millis(settings.identify.interval_ms),
                Duration::from_millis(settings.identify.reidentify_interval_ms),
            ),
            infer_gate: InferGate::new(Duration::from_millis(settings.infer.interval_ms)),
            alert_gate: DrowsyAlertGate::new(&settings.alert),
            idle: IdleWatermark::new(settings.idle.report_step_secs),
            verified: VerifiedLedger::new(),
            lifecycle: LifecycleController::new(settings.lifecycle.clone()),
            last_state_shown: None,
            started: false,
            source: None,
            identity: None,
            session,
            reporter,
            settings,
            backend,
            provider,
            probe,
            intent_store,
            overlay,
            alert_sink,
            cmd_rx,
            done_tx,
            done_rx,
            cancel: cancel.clone(),
        };

        let handle = MonitorHandle { tx: cmd_tx, cancel };
        (controller, handle)
    }

    /// Run until shutdown. All mutation happens on this task.
    pub async fn run(mut self) {
        let mut capture_tick =
            tokio::time::interval(Duration::from_millis(self.settings.capture.interval_ms));
        let mut idle_tick = tokio::time::interval(Duration::from_secs(1));
        let mut poll_tick =
            tokio::time::interval(Duration::from_millis(self.settings.lifecycle.poll_ms));
        capture_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        idle_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.overlay
            .log_line("Ready. Detection will start when you join the meeting.");

        // A join intent persisted just before the host page navigated is
        // consumed (at most once) here
        if self.lifecycle.resume_persisted(self.intent_store.as_ref(), Instant::now()) {
            self.overlay.log_line("Resuming after page navigation.");
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.stop_capture("shutdown");
                    break;
                }
                Some(cmd) = self.cmd_rx.recv() => {
                    if self.handle_command(cmd) {
                        capture_tick.reset();
                        idle_tick.reset();
                    }
                }
                Some(done) = self.done_rx.recv() => self.handle_completion(done),
                _ = capture_tick.tick(), if self.started => self.on_capture_tick(),
                _ = idle_tick.tick(), if self.started => self.on_idle_tick(),
                _ = poll_tick.tick() => {
                    if self.on_poll_tick() {
                        capture_tick.reset();
                        idle_tick.reset();
                    }
                }
            }
        }

        info!("Monitor controller finished");
    }

    /// Returns true when capture freshly started (the caller realigns the
    /// capture and idle timers).
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Start => {
                let fresh = self.start_capture();
                if fresh {
                    self.lifecycle.notify_started();
                }
                fresh
            }
            Command::Stop => {
                self.stop_capture("manual stop");
                self.lifecycle.notify_stopped();
                false
            }
            Command::Activity => {
                if self.started {
                    self.idle.reset();
                    self.overlay.set_idle_seconds(0);
                }
                false
            }
            Command::Visibility { visible } => {
                self.overlay.set_tab_status(visible);
                if self.started {
                    let kind = if visible {
                        SignalKind::TabBack
                    } else {
                        SignalKind::TabAway
                    };
                    self.spawn_signal(kind, None);
                }
                false
            }
            Command::UiClick { label } => {
                let action = self.lifecycle.on_click(
                    &label,
                    Instant::now(),
                    self.intent_store.as_ref(),
                );
                self.apply_action(action)
            }
            Command::PageUnload => {
                let action = self.lifecycle.on_unload();
                self.apply_action(action)
            }
        }
    }

    fn apply_action(&mut self, action: Option<LifecycleAction>) -> bool {
        match action {
            Some(LifecycleAction::StartCapture) => {
                let fresh = self.start_capture();
                if !fresh && !self.started {
                    // The start attempt failed; fall back to Idle so a
                    // later join can retry
                    self.lifecycle.notify_stopped();
                }
                fresh
            }
            Some(LifecycleAction::StopCapture) => {
                self.stop_capture("call ended");
                false
            }
            None => false,
        }
    }

    /// Begin capture. Idempotent: a no-op while already running.
    fn start_capture(&mut self) -> bool {
        if self.started {
            debug!("Capture already running");
            return false;
        }

        match select_source(self.provider.as_ref(), &self.settings.capture.frame_config()) {
            Ok(source) => {
                let line = match source.kind() {
                    SourceKind::Conference => "Using conference video as source.",
                    SourceKind::FallbackCamera => "Fallback camera active.",
                };
                self.overlay.log_line(line);
                self.source = Some(source);
            }
            Err(e) => {
                warn!("Capture start failed: {}", e);
                self.overlay.log_line(&format!("Error: no video source ({e})."));
                return false;
            }
        }

        self.started = true;
        self.idle.reset();
        self.identify_gate.reset();
        self.infer_gate.reset();
        self.last_state_shown = None;

        if self.settings.identify.clear_identity_on_stop {
            self.identity = None;
        } else if self.identity.is_some() {
            // Retained identity stays trusted for a full re-identify window
            self.identify_gate.mark_identified(Instant::now());
        }

        self.overlay.set_idle_seconds(0);
        self.overlay.set_running(true);
        self.overlay.log_line("Started.");
        info!("Capture started");

        // Have the session ready before the first event needs it
        let session = self.session.clone();
        tokio::spawn(async move {
            session.ensure().await;
        });

        true
    }

    /// End capture. Idempotent. The conference surface is never closed;
    /// only a fallback camera is released.
    fn stop_capture(&mut self, reason: &str) {
        if !self.started {
            return;
        }
        self.started = false;

        if let Some(mut source) = self.source.take() {
            if source.kind() == SourceKind::FallbackCamera {
                source.release();
            }
        }

        if self.settings.identify.clear_identity_on_stop {
            self.identity = None;
        }
        self.idle.reset();

        self.overlay.set_running(false);
        self.overlay.log_line("Stopped.");
        info!("Capture stopped ({})", reason);

        if let Some(sid) = self.session.invalidate() {
            let backend = self.backend.clone();
            tokio::spawn(async move {
                if let Err(e) = backend.close_session(&sid).await {
                    warn!("Session stop failed: {}", e);
                }
            });
        }
    }

    /// Grab, process, and dispatch one frame to whichever calls are due.
    fn on_capture_tick(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };

        let raw = match source.grab() {
            Ok(frame) => frame,
            Err(CaptureError::NotReady) => {
                debug!("Video not ready yet");
                return;
            }
            Err(e) => {
                warn!("Frame grab failed: {}", e);
                return;
            }
        };

        let jpeg = match self.processor.encode(&raw) {
            Ok(jpeg) => Arc::new(jpeg),
            Err(e) => {
                warn!("Frame encode failed: {}", e);
                return;
            }
        };

        let now = Instant::now();

        if self.identify_gate.should_dispatch(now) {
            self.identify_gate.mark_dispatched(now);
            let backend = self.backend.clone();
            let frame = jpeg.clone();
            let camera_id = self.settings.session.camera_id.clone();
            let session_id = self.session.current();
            let done = self.done_tx.clone();
            tokio::spawn(async move {
                let result = backend
                    .identify(&frame, &camera_id, session_id.as_deref())
                    .await;
                let _ = done.send(Completion::Identify(result)).await;
            });
        }

        if self.infer_gate.should_dispatch(now) {
            self.infer_gate.mark_dispatched(now);
            let backend = self.backend.clone();
            let frame = jpeg.clone();
            let camera_id = self.settings.session.camera_id.clone();
            let session_id = self.session.current();
            let done = self.done_tx.clone();
            tokio::spawn(async move {
                let result = backend
                    .infer(&frame, &camera_id, session_id.as_deref())
                    .await;
                let _ = done.send(Completion::Infer(result)).await;
            });
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Identify(result) => {
                // The flag clears on every path, success or failure
                self.identify_gate.settle();
                if !self.started {
                    debug!("Identify completion after stop, ignored");
                    return;
                }
                self.on_identify_result(result);
            }
            Completion::Infer(result) => {
                self.infer_gate.settle();
                if !self.started {
                    debug!("Infer completion after stop, ignored");
                    return;
                }
                self.on_infer_result(result);
            }
        }
    }

    fn on_identify_result(&mut self, result: Result<IdentifyResponse, BackendError>) {
        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Identify failed: {}", e);
                return;
            }
        };

        if !resp.is_match() {
            debug!("Identify: no match yet (pending={})", resp.pending);
            self.overlay.log_line("Identify: no match yet.");
            return;
        }

        let id = resp.student_id.unwrap_or_default();
        let ident = Identity::new(id.clone(), resp.name.unwrap_or_default());

        self.identify_gate.mark_identified(Instant::now());
        self.overlay.set_identity(ident.display_label());
        self.overlay
            .log_line(&format!("Identified as {}.", ident.display_label()));
        info!("Identified as {} ({})", ident.display_label(), id);

        // One verified signal per (session, student) pair
        if let Some(sid) = self.session.current() {
            if self.verified.first_sighting(&sid, &id) {
                let reporter = self.reporter.clone();
                let identity = ident.clone();
                tokio::spawn(async move {
                    reporter
                        .report_signal(Some(&identity), SignalKind::Verified, None)
                        .await;
                });
            }
        }

        self.identity = Some(ident);
    }

    fn on_infer_result(&mut self, result: Result<InferResponse, BackendError>) {
        let resp = match result {
            Ok(resp) if resp.ok => resp,
            Ok(_) => {
                warn!("Infer rejected by backend");
                return;
            }
            Err(e) => {
                warn!("Infer failed: {}", e);
                return;
            }
        };

        let inference = InferenceResult::from_response(&resp);
        let now = Instant::now();

        if self
            .alert_gate
            .should_fire(&inference.state, inference.score, now)
        {
            self.alert_gate.record_fire(now);
            info!("Drowsy alert (score {:.2})", inference.score);
            self.alert_sink.play();
        }

        // Update the displayed state only when it changes
        let label = inference.state.label().to_string();
        if self.last_state_shown.as_deref() != Some(label.as_str()) {
            self.overlay.set_state(&label);
            self.overlay
                .log_line(&format!("State: {} ({:.3})", label, inference.score));
            self.last_state_shown = Some(label.clone());
        }

        let reporter = self.reporter.clone();
        let identity = self.identity.clone();
        tokio::spawn(async move {
            reporter
                .report_state(identity.as_ref(), &label, inference.score, inference.bbox)
                .await;
        });
    }

    fn on_idle_tick(&mut self) {
        let due = self.idle.tick();
        self.overlay.set_idle_seconds(self.idle.seconds());

        if let Some(delta) = due {
            self.spawn_signal(SignalKind::Idle, Some(serde_json::json!({ "duration_s": delta })));
        }
    }

    /// Returns true when the poll started capture.
    fn on_poll_tick(&mut self) -> bool {
        let in_call = self.probe.in_call();
        let action = self.lifecycle.on_poll(in_call, Instant::now());
        self.apply_action(action)
    }

    fn spawn_signal(&self, kind: SignalKind, value: Option<serde_json::Value>) {
        let reporter = self.reporter.clone();
        let identity = self.identity.clone();
        tokio::spawn(async move {
            reporter.report_signal(identity.as_ref(), kind, value).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use backend_client::{EngagementEvent, SessionResponse};
    use frame_capture::{JpegFrame, MockSurfaceProvider, SourceInfo};
    use lifecycle::{MemoryIntentStore, StaticProbe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend fake with controllable latency and full call accounting
    struct TestBackend {
        identify_delay: Duration,
        infer_delay: Duration,
        identify_response: Mutex<IdentifyResponse>,
        infer_response: Mutex<InferResponse>,
        identify_calls: AtomicUsize,
        identify_active: AtomicUsize,
        identify_max_active: AtomicUsize,
        infer_calls: AtomicUsize,
        events: Mutex<Vec<serde_json::Value>>,
        stops: AtomicUsize,
    }

    impl TestBackend {
        fn new() -> Self {
            Self {
                identify_delay: Duration::ZERO,
                infer_delay: Duration::ZERO,
                identify_response: Mutex::new(IdentifyResponse::default()),
                infer_response: Mutex::new(InferResponse {
                    ok: true,
                    state: Some("awake".to_string()),
                    state_score: Some(0.9),
                    ..Default::default()
                }),
                identify_calls: AtomicUsize::new(0),
                identify_active: AtomicUsize::new(0),
                identify_max_active: AtomicUsize::new(0),
                infer_calls: AtomicUsize::new(0),
                events: Mutex::new(Vec::new()),
                stops: AtomicUsize::new(0),
            }
        }

        fn with_identify_delay(mut self, delay: Duration) -> Self {
            self.identify_delay = delay;
            self
        }

        fn with_infer_delay(mut self, delay: Duration) -> Self {
            self.infer_delay = delay;
            self
        }

        fn with_match(self, id: &str, name: &str) -> Self {
            *self.identify_response.lock().unwrap() = IdentifyResponse {
                ok: true,
                student_id: Some(id.to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            };
            self
        }

        fn event_count(&self, key: &str, value: &str) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e[key] == value)
                .count()
        }
    }

    #[async_trait::async_trait]
    impl BackendClient for TestBackend {
        async fn open_session(
            &self,
            _req: &SessionRequest,
        ) -> Result<SessionResponse, BackendError> {
            Ok(SessionResponse {
                ok: true,
                session_id: Some("sess-1".to_string()),
            })
        }

        async fn identify(
            &self,
            _frame: &JpegFrame,
            _camera_id: &str,
            _session_id: Option<&str>,
        ) -> Result<IdentifyResponse, BackendError> {
            self.identify_calls.fetch_add(1, Ordering::SeqCst);
            let active = self.identify_active.fetch_add(1, Ordering::SeqCst) + 1;
            self.identify_max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.identify_delay).await;
            self.identify_active.fetch_sub(1, Ordering::SeqCst);
            Ok(self.identify_response.lock().unwrap().clone())
        }

        async fn infer(
            &self,
            _frame: &JpegFrame,
            _camera_id: &str,
            _session_id: Option<&str>,
        ) -> Result<InferResponse, BackendError> {
            self.infer_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.infer_delay).await;
            Ok(self.infer_response.lock().unwrap().clone())
        }

        async fn post_event(&self, event: &EngagementEvent) -> Result<(), BackendError> {
            self.events
                .lock()
                .unwrap()
                .push(serde_json::to_value(event).unwrap());
            Ok(())
        }

        async fn close_session(&self, _session_id: &str) -> Result<(), BackendError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Overlay fake recording every call
    #[derive(Default)]
    struct RecordingOverlay {
        lines: Mutex<Vec<String>>,
        states: Mutex<Vec<String>>,
        running: Mutex<Vec<bool>>,
    }

    impl StatusSink for Arc<RecordingOverlay> {
        fn log_line(&self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }
        fn set_identity(&self, _label: &str) {}
        fn set_idle_seconds(&self, _secs: u64) {}
        fn set_tab_status(&self, _here: bool) {}
        fn set_state(&self, label: &str) {
            self.states.lock().unwrap().push(label.to_string());
        }
        fn set_running(&self, running: bool) {
            self.running.lock().unwrap().push(running);
        }
    }

    fn surfaces() -> Vec<SourceInfo> {
        vec![SourceInfo {
            id: "speaker".to_string(),
            width: 1280,
            height: 720,
        }]
    }

    fn spawn_monitor(
        backend: Arc<TestBackend>,
        provider: MockSurfaceProvider,
        settings: Settings,
    ) -> (MonitorHandle, Arc<RecordingOverlay>) {
        let overlay = Arc::new(RecordingOverlay::default());
        let (controller, handle) = MonitorController::new(
            settings,
            backend,
            Box::new(provider),
            Box::new(StaticProbe(true)),
            Box::new(MemoryIntentStore::new()),
            Box::new(overlay.clone()),
            Box::new(alerting::SilentAlert),
        );
        tokio::spawn(controller.run());
        (handle, overlay)
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_one_identify_in_flight() {
        // Identify takes far longer than the capture cadence
        let backend =
            Arc::new(TestBackend::new().with_identify_delay(Duration::from_secs(30)));
        let (handle, _overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        handle.start().await;
        tokio::time::sleep(Duration::from_secs(25)).await;

        // Many frames arrived, but the first identify is still in flight
        assert_eq!(backend.identify_max_active.load(Ordering::SeqCst), 1);
        assert_eq!(backend.identify_calls.load(Ordering::SeqCst), 1);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_infer_runs_without_identity() {
        // Identify never matches; inference keeps flowing regardless
        let backend = Arc::new(TestBackend::new());
        let (handle, _overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        handle.start().await;
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert!(backend.infer_calls.load(Ordering::SeqCst) >= 3);
        let events = backend.events.lock().unwrap();
        let state_event = events.iter().find(|e| e["state"] == "Awake").unwrap();
        assert_eq!(state_event["student_id"], serde_json::Value::Null);
        assert_eq!(state_event["name"], "Unknown");
        drop(events);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_verified_event_fires_once_per_session() {
        let backend = Arc::new(TestBackend::new().with_match("S1", "Aisha"));
        let mut settings = Settings::default();
        // Aggressive re-identify so several matches land in one run
        settings.identify.reidentify_interval_ms = 6_000;
        let (handle, _overlay) =
            spawn_monitor(backend.clone(), MockSurfaceProvider::new(surfaces()), settings);

        handle.start().await;
        tokio::time::sleep(Duration::from_secs(40)).await;

        assert!(backend.identify_calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(backend.event_count("type", "verified"), 1);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_late_infer_response_changes_nothing() {
        let backend = Arc::new(TestBackend::new().with_infer_delay(Duration::from_secs(10)));
        let (handle, overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        handle.start().await;
        // Let exactly one infer dispatch, then stop before it resolves
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(backend.infer_calls.load(Ordering::SeqCst), 1);
        handle.stop().await;
        tokio::time::sleep(Duration::from_secs(20)).await;

        // The late response posted no state event and drew no state label
        assert_eq!(backend.event_count("state", "Awake"), 0);
        assert!(overlay.states.lock().unwrap().is_empty());
        // Best-effort /stop went out
        assert_eq!(backend.stops.load(Ordering::SeqCst), 1);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fails_cleanly_with_no_source() {
        let backend = Arc::new(TestBackend::new());
        let provider = MockSurfaceProvider::camera_only().deny_camera();
        let (handle, overlay) = spawn_monitor(backend.clone(), provider, Settings::default());

        handle.start().await;
        tokio::time::sleep(Duration::from_secs(15)).await;

        // Stopped state: no running transition, an error line, and no
        // capture or idle traffic
        assert!(overlay.running.lock().unwrap().is_empty());
        assert!(overlay
            .lines
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.starts_with("Error: no video source")));
        assert_eq!(backend.infer_calls.load(Ordering::SeqCst), 0);
        assert!(backend.events.lock().unwrap().is_empty());

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_reports_every_ten_seconds_and_reset_on_activity() {
        let backend = Arc::new(TestBackend::new());
        let (handle, _overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        handle.start().await;
        tokio::time::sleep(Duration::from_millis(21_500)).await;
        assert_eq!(backend.event_count("type", "idle"), 2);

        // Activity resets the counter; nine more seconds stay quiet
        handle.send(Command::Activity).await;
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(backend.event_count("type", "idle"), 2);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_visibility_signals_only_while_running() {
        let backend = Arc::new(TestBackend::new());
        let (handle, _overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        // Not started yet: visibility changes draw the overlay only
        handle.send(Command::Visibility { visible: false }).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(backend.event_count("type", "tab_away"), 0);

        handle.start().await;
        handle.send(Command::Visibility { visible: false }).await;
        handle.send(Command::Visibility { visible: true }).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(backend.event_count("type", "tab_away"), 1);
        assert_eq!(backend.event_count("type", "tab_back"), 1);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_label_updates_only_on_change() {
        let backend = Arc::new(TestBackend::new());
        let (handle, overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        handle.start().await;
        // Assert between tick instants so completions have settled
        tokio::time::sleep(Duration::from_millis(9_500)).await;

        // Several Awake inferences, one label draw
        assert!(backend.infer_calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(overlay.states.lock().unwrap().as_slice(), ["Awake"]);

        *backend.infer_response.lock().unwrap() = InferResponse {
            ok: true,
            state: Some("yawning".to_string()),
            state_score: Some(0.95),
            ..Default::default()
        };
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(
            overlay.states.lock().unwrap().as_slice(),
            ["Awake", "Drowsy"]
        );

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_a_noop() {
        let backend = Arc::new(TestBackend::new());
        let (handle, overlay) = spawn_monitor(
            backend.clone(),
            MockSurfaceProvider::new(surfaces()),
            Settings::default(),
        );

        handle.start().await;
        handle.start().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(overlay.running.lock().unwrap().as_slice(), [true]);

        handle.shutdown();
    }
}
