//! Engagement State Analysis
//!
//! Client-side half of the remote inference loop:
//! - Label normalization across backend revisions and free-text synonyms
//! - Confidence/bbox extraction with key-priority resolution
//! - Identity tracking for the recognized student
//! - Timestamp + in-flight dispatch gates for the identify and infer calls

pub mod gate;
pub mod identity;
pub mod result;
pub mod state;

pub use gate::{IdentifyGate, InferGate};
pub use identity::{wire_name, Identity};
pub use result::InferenceResult;
pub use state::EngagementState;
