//! Dispatch gates for the identify and infer calls
//!
//! Each backend call kind is guarded by an in-flight flag plus a minimum
//! spacing from its last dispatch. There is no queue: a frame arriving
//! while a call of the same kind is outstanding is simply not processed
//! by that call.

use tokio::time::{Duration, Instant};

/// Gate for face-identification calls.
///
/// Dispatch is allowed only when no identify call is outstanding, the
/// inter-call spacing has elapsed since the last attempt (regardless of
/// its outcome), and either no identity is held or the re-identify
/// interval has passed since it was set.
#[derive(Debug)]
pub struct IdentifyGate {
    min_spacing: Duration,
    reidentify_interval: Duration,
    in_flight: bool,
    last_attempt: Option<Instant>,
    identified_at: Option<Instant>,
}

impl IdentifyGate {
    pub fn new(min_spacing: Duration, reidentify_interval: Duration) -> Self {
        Self {
            min_spacing,
            reidentify_interval,
            in_flight: false,
            last_attempt: None,
            identified_at: None,
        }
    }

    pub fn should_dispatch(&self, now: Instant) -> bool {
        if self.in_flight {
            return false;
        }
        if let Some(last) = self.last_attempt {
            if now.duration_since(last) < self.min_spacing {
                return false;
            }
        }
        match self.identified_at {
            None => true,
            Some(at) => now.duration_since(at) >= self.reidentify_interval,
        }
    }

    /// Record a dispatch; holds the in-flight flag until `settle`
    pub fn mark_dispatched(&mut self, now: Instant) {
        self.in_flight = true;
        self.last_attempt = Some(now);
    }

    /// Clear the in-flight flag. Called on every completion path,
    /// success or failure.
    pub fn settle(&mut self) {
        self.in_flight = false;
    }

    /// Record that an identity was stored at `now`
    pub fn mark_identified(&mut self, now: Instant) {
        self.identified_at = Some(now);
    }

    /// Forget identify timing on capture restart. The in-flight flag is
    /// left alone: a call dispatched before stop may still be outstanding.
    pub fn reset(&mut self) {
        self.last_attempt = None;
        self.identified_at = None;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Gate for state-inference calls: in-flight flag plus fixed cadence.
/// Runs regardless of identification outcome.
#[derive(Debug)]
pub struct InferGate {
    interval: Duration,
    in_flight: bool,
    last_dispatch: Option<Instant>,
}

impl InferGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            in_flight: false,
            last_dispatch: None,
        }
    }

    pub fn should_dispatch(&self, now: Instant) -> bool {
        if self.in_flight {
            return false;
        }
        match self.last_dispatch {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    pub fn mark_dispatched(&mut self, now: Instant) {
        self.in_flight = true;
        self.last_dispatch = Some(now);
    }

    pub fn settle(&mut self) {
        self.in_flight = false;
    }

    pub fn reset(&mut self) {
        self.last_dispatch = None;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACING: Duration = Duration::from_secs(5);
    const REIDENT: Duration = Duration::from_secs(60);

    #[test]
    fn test_no_second_identify_while_in_flight() {
        let mut gate = IdentifyGate::new(SPACING, REIDENT);
        let t0 = Instant::now();

        assert!(gate.should_dispatch(t0));
        gate.mark_dispatched(t0);

        // Frames keep arriving while the call is outstanding
        for secs in [1, 10, 100] {
            assert!(!gate.should_dispatch(t0 + Duration::from_secs(secs)));
        }

        gate.settle();
        assert!(gate.should_dispatch(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn test_spacing_applies_regardless_of_outcome() {
        let mut gate = IdentifyGate::new(SPACING, REIDENT);
        let t0 = Instant::now();

        gate.mark_dispatched(t0);
        gate.settle(); // failed attempt, no identity stored

        assert!(!gate.should_dispatch(t0 + Duration::from_secs(4)));
        assert!(gate.should_dispatch(t0 + SPACING));
    }

    #[test]
    fn test_held_identity_defers_until_reidentify_interval() {
        let mut gate = IdentifyGate::new(SPACING, REIDENT);
        let t0 = Instant::now();

        gate.mark_dispatched(t0);
        gate.settle();
        gate.mark_identified(t0);

        // Spacing has long elapsed but the identity is fresh
        assert!(!gate.should_dispatch(t0 + Duration::from_secs(30)));
        assert!(gate.should_dispatch(t0 + REIDENT));
    }

    #[test]
    fn test_reset_forgets_identity_but_not_in_flight() {
        let mut gate = IdentifyGate::new(SPACING, REIDENT);
        let t0 = Instant::now();

        gate.mark_dispatched(t0);
        gate.reset();
        // Still outstanding from before the restart
        assert!(!gate.should_dispatch(t0 + Duration::from_secs(10)));

        gate.settle();
        assert!(gate.should_dispatch(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_infer_cadence() {
        let mut gate = InferGate::new(Duration::from_secs(3));
        let t0 = Instant::now();

        assert!(gate.should_dispatch(t0));
        gate.mark_dispatched(t0);
        gate.settle();

        assert!(!gate.should_dispatch(t0 + Duration::from_secs(2)));
        assert!(gate.should_dispatch(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_infer_in_flight_blocks() {
        let mut gate = InferGate::new(Duration::from_secs(3));
        let t0 = Instant::now();

        gate.mark_dispatched(t0);
        assert!(!gate.should_dispatch(t0 + Duration::from_secs(30)));
        gate.settle();
        assert!(gate.should_dispatch(t0 + Duration::from_secs(30)));
    }
}
