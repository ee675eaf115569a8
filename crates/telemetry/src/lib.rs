//! Engagement Telemetry
//!
//! Write-only telemetry path to the backend:
//! - Lazily created, memoized session record per page visit
//! - Event reporter with a fixed envelope shape (drop silently when no
//!   session can be resolved; log-and-continue on transport failure)
//! - Idle accounting in completed 10-second increments
//! - At-most-once "verified" signal per (session, student) pair

pub mod idle;
pub mod reporter;
pub mod session;
pub mod verified;

pub use idle::IdleWatermark;
pub use reporter::EventReporter;
pub use session::SessionTracker;
pub use verified::VerifiedLedger;
