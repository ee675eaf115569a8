//! Drowsy alert gating

use engagement::EngagementState;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Confidence required for an alert
    pub score_threshold: f64,
    /// Minimum spacing between alerts (seconds)
    pub cooldown_secs: u64,
    /// Tone frequency in Hz
    pub tone_hz: f32,
    /// Tone length in milliseconds
    pub tone_duration_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.70,
            cooldown_secs: 30,
            tone_hz: 880.0,
            tone_duration_ms: 450,
        }
    }
}

/// Gate deciding when a drowsy frame triggers the local cue
#[derive(Debug)]
pub struct DrowsyAlertGate {
    score_threshold: f64,
    cooldown: Duration,
    last_fired: Option<Instant>,
}

impl DrowsyAlertGate {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            score_threshold: config.score_threshold,
            cooldown: Duration::from_secs(config.cooldown_secs),
            last_fired: None,
        }
    }

    /// True iff the state is Drowsy at sufficient confidence and the
    /// cooldown floor has elapsed.
    pub fn should_fire(&self, state: &EngagementState, score: f64, now: Instant) -> bool {
        if *state != EngagementState::Drowsy {
            return false;
        }
        // NaN compares false and is rejected here too
        if !(score >= self.score_threshold) {
            debug!(
                "Alert suppressed: score {} < threshold {}",
                score, self.score_threshold
            );
            return false;
        }
        match self.last_fired {
            None => true,
            Some(last) => now.duration_since(last) >= self.cooldown,
        }
    }

    /// Record that the cue fired
    pub fn record_fire(&mut self, now: Instant) {
        self.last_fired = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> DrowsyAlertGate {
        DrowsyAlertGate::new(&AlertConfig::default())
    }

    #[test]
    fn test_threshold() {
        let gate = gate();
        let now = Instant::now();

        assert!(!gate.should_fire(&EngagementState::Drowsy, 0.5, now));
        assert!(gate.should_fire(&EngagementState::Drowsy, 0.70, now));
        assert!(!gate.should_fire(&EngagementState::Awake, 0.99, now));
        assert!(!gate.should_fire(&EngagementState::Unknown, 0.99, now));
    }

    #[test]
    fn test_nan_score_never_fires() {
        let gate = gate();
        assert!(!gate.should_fire(&EngagementState::Drowsy, f64::NAN, Instant::now()));
    }

    #[test]
    fn test_cooldown_is_a_hard_floor() {
        let mut gate = gate();
        let t0 = Instant::now();

        assert!(gate.should_fire(&EngagementState::Drowsy, 0.9, t0));
        gate.record_fire(t0);

        // Qualifying frames every second for a minute: at most one more
        // alert is allowed, at the 30s mark
        let mut fired = 0;
        for s in 1..=60u64 {
            let now = t0 + Duration::from_secs(s);
            if gate.should_fire(&EngagementState::Drowsy, 0.9, now) {
                gate.record_fire(now);
                fired += 1;
            }
        }
        assert_eq!(fired, 2); // at t0+30 and t0+60
    }

    #[test]
    fn test_single_qualifying_frame_fires_once() {
        let mut gate = gate();
        let t0 = Instant::now();

        assert!(gate.should_fire(&EngagementState::Drowsy, 0.8, t0));
        gate.record_fire(t0);
        assert!(!gate.should_fire(&EngagementState::Drowsy, 0.8, t0 + Duration::from_secs(1)));
    }
}
