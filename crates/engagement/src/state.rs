//! Engagement state labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized attentiveness state.
///
/// The backend's models have emitted a variety of labels over time
/// ("alert", "sleepy", "eyes closed", ...); everything funnels into these
/// buckets, with unrecognized labels passed through for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementState {
    Awake,
    Drowsy,
    Unknown,
    Other(String),
}

/// Substrings that mark a label as drowsiness-adjacent
const DROWSY_MARKERS: [&str; 5] = ["drow", "sleep", "yawn", "close", "tired"];

impl EngagementState {
    /// Normalize a raw backend label.
    pub fn normalize(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        match s.as_str() {
            "awake" | "alert" => return EngagementState::Awake,
            "unknown" | "" => return EngagementState::Unknown,
            _ => {}
        }
        if DROWSY_MARKERS.iter().any(|m| s.contains(m)) {
            return EngagementState::Drowsy;
        }
        EngagementState::Other(raw.trim().to_string())
    }

    /// Label used on the wire and in the overlay
    pub fn label(&self) -> &str {
        match self {
            EngagementState::Awake => "Awake",
            EngagementState::Drowsy => "Drowsy",
            EngagementState::Unknown => "Unknown",
            EngagementState::Other(s) => s,
        }
    }
}

impl fmt::Display for EngagementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
