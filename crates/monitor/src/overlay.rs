//! Overlay view seam
//!
//! The injected widget is a pure view: the controller pushes display
//! updates through this trait and never reads back. Hosts provide their
//! own rendering; the default implementation mirrors everything to the
//! log stream.

use tracing::info;

/// Display surface for live monitor state
pub trait StatusSink: Send {
    /// Append a timestamped line to the overlay log area
    fn log_line(&self, text: &str);

    /// Show the recognized name/id
    fn set_identity(&self, label: &str);

    /// Show seconds since last user activity
    fn set_idle_seconds(&self, secs: u64);

    /// Show whether the tab is focused ("here") or not ("away")
    fn set_tab_status(&self, here: bool);

    /// Show the current inferred state label
    fn set_state(&self, label: &str);

    /// Reflect running/stopped in the controls
    fn set_running(&self, running: bool);
}

/// Overlay that renders into the tracing stream
#[derive(Debug, Default, Clone)]
pub struct TracingOverlay;

impl TracingOverlay {
    pub fn new() -> Self {
        Self
    }
}

impl StatusSink for TracingOverlay {
    fn log_line(&self, text: &str) {
        info!(target: "overlay", "{}", text);
    }

    fn set_identity(&self, label: &str) {
        info!(target: "overlay", "Name / ID: {}", label);
    }

    fn set_idle_seconds(&self, _secs: u64) {
        // 1 Hz counter updates are too noisy for the log stream
    }

    fn set_tab_status(&self, here: bool) {
        info!(target: "overlay", "Tab: {}", if here { "here" } else { "away" });
    }

    fn set_state(&self, label: &str) {
        info!(target: "overlay", "State: {}", label);
    }

    fn set_running(&self, running: bool) {
        info!(
            target: "overlay",
            "Monitor {}",
            if running { "running" } else { "stopped" }
        );
    }
}
