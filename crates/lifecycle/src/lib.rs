//! Capture Lifecycle Control
//!
//! Starts and stops the capture pipeline in sync with the user joining or
//! leaving a call, from best-effort signals against a third-party UI with
//! no stability contract:
//! - Click intent classification over a locale-spanning keyword set
//! - A polled in-call probe promoting pending starts and detecting exits
//! - A persisted, consume-once start intent that survives the host page's
//!   full SPA navigation
//!
//! False positives are tolerated (capture start is idempotent); false
//! negatives leave the manual overlay buttons as the fallback.

pub mod controller;
pub mod intent;

pub use controller::{CallPhase, LifecycleAction, LifecycleConfig, LifecycleController};
pub use intent::{
    classify_intent, CallIntent, CallProbe, MemoryIntentStore, StartIntentStore, StaticProbe,
};
