//! Per-frame inference result extraction

use crate::state::EngagementState;
use backend_client::{Bbox, InferResponse};
use serde::{Deserialize, Serialize};

/// Normalized result of one infer call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub state: EngagementState,
    /// Confidence in [0, 1]; 0 when the backend sent none
    pub score: f64,
    pub bbox: Option<Bbox>,
}

impl InferenceResult {
    /// Resolve the label and score out of whichever keys this backend
    /// revision populated. First non-null wins, in a fixed priority order.
    pub fn from_response(resp: &InferResponse) -> Self {
        let raw_label = resp
            .state
            .as_deref()
            .or(resp.label.as_deref())
            .or(resp.class_name.as_deref())
            .or(resp.class_compat.as_deref())
            .unwrap_or("Unknown");

        let score = resp
            .state_score
            .or(resp.score)
            .or(resp.confidence)
            .unwrap_or(0.0);

        Self {
            state: EngagementState::normalize(raw_label),
            score,
            bbox: resp.bbox.clone(),
        }
    }
}
