//! Audio cue playback

use crate::AlertConfig;
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Plays the local alert cue. Playback is fire-and-forget: if the output
/// device cannot be opened the failure is logged and the cue is skipped,
/// never retried.
pub trait AlertSink: Send {
    fn play(&self);
}

/// Short synthesized beep with a quick fade-in/out envelope.
#[derive(Debug, Clone)]
pub struct ToneAlert {
    frequency_hz: f32,
    duration: Duration,
}

impl ToneAlert {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            frequency_hz: config.tone_hz,
            duration: Duration::from_millis(config.tone_duration_ms),
        }
    }
}

impl AlertSink for ToneAlert {
    fn play(&self) {
        let frequency_hz = self.frequency_hz;
        let duration = self.duration;

        // rodio output handles are !Send, so the whole stream lives on a
        // short-lived dedicated thread.
        let spawned = thread::Builder::new()
            .name("alert-tone".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("Alert tone skipped, no audio output: {}", e);
                        return;
                    }
                };
                let sink = match Sink::try_new(&handle) {
                    Ok(sink) => sink,
                    Err(e) => {
                        warn!("Alert tone skipped, sink failed: {}", e);
                        return;
                    }
                };

                let source = SineWave::new(frequency_hz)
                    .take_duration(duration)
                    .fade_in(Duration::from_millis(20))
                    .amplify(0.20);
                sink.append(source);
                sink.sleep_until_end();
                debug!("Alert tone played ({} Hz)", frequency_hz);
            });

        if let Err(e) = spawned {
            warn!("Alert tone thread failed to start: {}", e);
        }
    }
}

/// No-op sink for headless runs and tests
#[derive(Debug, Default, Clone)]
pub struct SilentAlert;

impl AlertSink for SilentAlert {
    fn play(&self) {}
}
