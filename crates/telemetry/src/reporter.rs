//! Engagement event reporter

use crate::session::SessionTracker;
use backend_client::{
    BackendClient, Bbox, EngagementEvent, EventPayload, SignalKind,
};
use chrono::Utc;
use engagement::{wire_name, Identity};
use std::sync::Arc;
use tracing::{debug, warn};

/// Posts engagement events to the backend.
///
/// Reports are best effort and write-only: if no session id can be
/// resolved the report is dropped silently, and a failed post is logged
/// and forgotten. There is no retry and no queue.
pub struct EventReporter {
    backend: Arc<dyn BackendClient>,
    session: Arc<SessionTracker>,
    course_id: String,
    camera_id: String,
}

impl EventReporter {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        session: Arc<SessionTracker>,
        course_id: impl Into<String>,
        camera_id: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            session,
            course_id: course_id.into(),
            camera_id: camera_id.into(),
        }
    }

    /// Post a per-frame inferred state
    pub async fn report_state(
        &self,
        identity: Option<&Identity>,
        state_label: &str,
        state_score: f64,
        bbox: Option<Bbox>,
    ) {
        let payload = EventPayload::State {
            state: state_label.to_string(),
            state_score,
            bbox,
        };
        self.post(identity, payload).await;
    }

    /// Post a discrete behavior signal (idle, tab_away, tab_back, verified)
    pub async fn report_signal(
        &self,
        identity: Option<&Identity>,
        kind: SignalKind,
        value: Option<serde_json::Value>,
    ) {
        self.post(identity, EventPayload::Signal { kind, value }).await;
    }

    async fn post(&self, identity: Option<&Identity>, payload: EventPayload) {
        let Some(session_id) = self.session.ensure().await else {
            debug!("Dropping event: no session id available");
            return;
        };

        let event = EngagementEvent {
            course_id: self.course_id.clone(),
            camera_id: self.camera_id.clone(),
            student_id: identity.map(|i| i.id.clone()),
            name: wire_name(identity),
            ts: Utc::now().timestamp(),
            session_id,
            payload,
        };

        if let Err(e) = self.backend.post_event(&event).await {
            warn!("Event post failed: {}", e);
        }
    }
}
