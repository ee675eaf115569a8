//! Local Alerting
//!
//! Rate-limited local audio cue for sustained high-confidence drowsiness.
//! The cooldown is a hard floor: no alert fires more than once per window
//! no matter how many qualifying frames arrive in between.

mod gate;
mod tone;

pub use gate::{AlertConfig, DrowsyAlertGate};
pub use tone::{AlertSink, SilentAlert, ToneAlert};
