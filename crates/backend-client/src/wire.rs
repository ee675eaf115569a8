//! Request and response shapes for the backend REST surface

use serde::{Deserialize, Serialize};

/// Face bounding box in frame coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Body of `POST /api/auto/session_from_meet`
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    pub course_id: String,
    pub meet_url: String,
    pub title: String,
}

/// Response of `POST /api/auto/session_from_meet`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub ok: bool,
    pub session_id: Option<String>,
}

/// Response of `POST /api/identify`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentifyResponse {
    #[serde(default)]
    pub ok: bool,
    pub student_id: Option<String>,
    pub name: Option<String>,
    /// Set while the backend is still enrolling/confirming this face
    #[serde(default)]
    pub pending: bool,
    pub bbox: Option<Bbox>,
    pub score: Option<f64>,
}

impl IdentifyResponse {
    /// A confident match: ok, a student id, and not pending
    pub fn is_match(&self) -> bool {
        self.ok && self.student_id.is_some() && !self.pending
    }
}

/// Response of `POST /api/infer`.
///
/// Backend revisions have disagreed on key names for the label and the
/// confidence; every observed spelling is accepted here and resolved by
/// priority in the `engagement` crate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferResponse {
    #[serde(default)]
    pub ok: bool,
    pub state: Option<String>,
    pub label: Option<String>,
    pub class_name: Option<String>,
    /// Bare `class` key sent by older backend builds
    #[serde(rename = "class")]
    pub class_compat: Option<String>,
    pub state_score: Option<f64>,
    pub score: Option<f64>,
    pub confidence: Option<f64>,
    pub bbox: Option<Bbox>,
}

/// Discrete engagement signal kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Idle,
    TabAway,
    TabBack,
    Verified,
}

/// Event body payload: either a per-frame inferred state or a discrete
/// behavior signal. Flattened into the envelope so the wire shape matches
/// what the backend aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    State {
        state: String,
        state_score: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        bbox: Option<Bbox>,
    },
    Signal {
        #[serde(rename = "type")]
        kind: SignalKind,
        value: Option<serde_json::Value>,
    },
}

/// Body of `POST /api/events`
#[derive(Debug, Clone, Serialize)]
pub struct EngagementEvent {
    pub course_id: String,
    pub camera_id: String,
    pub student_id: Option<String>,
    pub name: String,
    /// Unix seconds
    pub ts: i64,
    pub session_id: String,
    #[serde(flatten)]
    pub payload: EventPayload,
}
