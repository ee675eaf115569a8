//! Classync Engagement Monitor
//!
//! Wires the capture, inference, telemetry, alerting, and lifecycle
//! pieces into one timer-driven controller task, and hosts the overlay
//! view seam, configuration tree, and binary entry point.

pub mod controller;
pub mod overlay;
pub mod settings;

pub use controller::{Command, MonitorController, MonitorHandle};
pub use overlay::{StatusSink, TracingOverlay};
pub use settings::Settings;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
