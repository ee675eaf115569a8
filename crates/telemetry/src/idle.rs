//! Idle accounting with a report watermark

/// Counts idle seconds and yields report deltas in completed increments.
///
/// Ticked once per second while capture runs. A report fires only when at
/// least `report_step` new seconds have accumulated since the watermark,
/// and the watermark then advances to the current counter — so a
/// continuous idle stretch of N seconds produces exactly
/// `floor(N / step)` reports and never double-counts across resets.
#[derive(Debug)]
pub struct IdleWatermark {
    report_step: u64,
    idle_seconds: u64,
    reported_seconds: u64,
}

impl IdleWatermark {
    pub fn new(report_step: u64) -> Self {
        Self {
            report_step: report_step.max(1),
            idle_seconds: 0,
            reported_seconds: 0,
        }
    }

    /// Advance one second of idleness. Returns the delta to report, if
    /// one is due.
    pub fn tick(&mut self) -> Option<u64> {
        self.idle_seconds += 1;

        let delta = self.idle_seconds - self.reported_seconds;
        if self.idle_seconds >= self.report_step && delta >= self.report_step {
            self.reported_seconds = self.idle_seconds;
            return Some(delta);
        }
        None
    }

    /// Reset on user activity or a fresh capture start
    pub fn reset(&mut self) {
        self.idle_seconds = 0;
        self.reported_seconds = 0;
    }

    /// Current idle counter, for the overlay
    pub fn seconds(&self) -> u64 {
        self.idle_seconds
    }

    /// Current watermark position
    pub fn reported(&self) -> u64 {
        self.reported_seconds
    }
}
