//! Lifecycle state machine

use crate::intent::{classify_intent, CallIntent, StartIntentStore};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

/// Where the controller believes the call is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Not in a call; capture stopped
    Idle,
    /// Join intent seen; waiting for the call surface to appear
    PendingStart,
    /// In a call; capture should be running
    Running,
}

/// What the capture pipeline should do in response to a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    StartCapture,
    StopCapture,
}

/// Lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Minimum spacing between honored intent clicks (milliseconds).
    /// The host UI re-renders constantly and replays click notifications.
    pub click_debounce_ms: u64,
    /// Delay between a join click and the first start attempt
    pub join_grace_ms: u64,
    /// How long a persisted start intent stays valid (seconds)
    pub intent_validity_secs: u64,
    /// In-call probe poll period (milliseconds)
    pub poll_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            click_debounce_ms: 1200,
            join_grace_ms: 1350,
            intent_validity_secs: 15,
            poll_ms: 800,
        }
    }
}

/// Drives `Idle -> PendingStart -> Running -> Idle` from click intents,
/// the polled in-call probe, and page unload.
pub struct LifecycleController {
    config: LifecycleConfig,
    phase: CallPhase,
    last_intent_click: Option<Instant>,
    pending_since: Option<Instant>,
    /// Probe answer at the previous poll; call exit requires a
    /// true -> false edge so a manual start outside a call is not
    /// immediately torn down.
    last_in_call: Option<bool>,
}

impl LifecycleController {
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            config,
            phase: CallPhase::Idle,
            last_intent_click: None,
            pending_since: None,
            last_in_call: None,
        }
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    /// Feed a clicked control's label through the intent heuristics.
    pub fn on_click(
        &mut self,
        label: &str,
        now: Instant,
        store: &dyn StartIntentStore,
    ) -> Option<LifecycleAction> {
        let intent = classify_intent(label)?;

        if let Some(last) = self.last_intent_click {
            if now.duration_since(last) < Duration::from_millis(self.config.click_debounce_ms) {
                debug!("Intent click debounced");
                return None;
            }
        }
        self.last_intent_click = Some(now);

        match intent {
            CallIntent::Join => {
                if self.phase == CallPhase::Idle {
                    info!("Join intent detected, pending start");
                    self.phase = CallPhase::PendingStart;
                    self.pending_since = Some(now);
                    store.persist(chrono::Utc::now().timestamp_millis());
                }
                None
            }
            CallIntent::Leave => self.exit("leave intent"),
        }
    }

    /// Periodic in-call probe result.
    pub fn on_poll(&mut self, in_call: bool, now: Instant) -> Option<LifecycleAction> {
        let was_in_call = self.last_in_call.replace(in_call);

        match self.phase {
            CallPhase::PendingStart => {
                let grace = Duration::from_millis(self.config.join_grace_ms);
                let grace_done = self
                    .pending_since
                    .map_or(true, |t| now.duration_since(t) >= grace);
                if in_call && grace_done {
                    info!("Call surface detected, starting capture");
                    self.phase = CallPhase::Running;
                    self.pending_since = None;
                    return Some(LifecycleAction::StartCapture);
                }
                None
            }
            CallPhase::Running => {
                if was_in_call == Some(true) && !in_call {
                    return self.exit("call surface gone");
                }
                None
            }
            CallPhase::Idle => None,
        }
    }

    /// Page teardown: stop whatever is pending or running.
    pub fn on_unload(&mut self) -> Option<LifecycleAction> {
        self.exit("page unload")
    }

    /// Consume a persisted start intent on a fresh page load. Valid
    /// intents re-arm `PendingStart`; stale ones are discarded.
    pub fn resume_persisted(&mut self, store: &dyn StartIntentStore, now: Instant) -> bool {
        let Some(ts_ms) = store.take() else {
            return false;
        };

        let age_ms = chrono::Utc::now().timestamp_millis().saturating_sub(ts_ms);
        if age_ms < 0 || age_ms as u64 > self.config.intent_validity_secs * 1000 {
            debug!("Discarding stale start intent ({} ms old)", age_ms);
            return false;
        }

        info!("Resuming persisted start intent");
        self.phase = CallPhase::PendingStart;
        self.pending_since = Some(now);
        true
    }

    /// Keep the machine in sync when capture is started manually.
    pub fn notify_started(&mut self) {
        self.phase = CallPhase::Running;
        self.pending_since = None;
    }

    /// Keep the machine in sync when capture stops (manually or after a
    /// failed start).
    pub fn notify_stopped(&mut self) {
        self.phase = CallPhase::Idle;
        self.pending_since = None;
    }

    fn exit(&mut self, reason: &str) -> Option<LifecycleAction> {
        match self.phase {
            CallPhase::Idle => None,
            phase => {
                info!("Stopping capture ({reason}) from {:?}", phase);
                self.phase = CallPhase::Idle;
                self.pending_since = None;
                Some(LifecycleAction::StopCapture)
            }
        }
    }
}
