//! Configuration tree
//!
//! Every timing and threshold constant of the capture loop is a field
//! here, layered from an optional `classync.toml` and `CLASSYNC_*`
//! environment variables onto the defaults.

use alerting::AlertConfig;
use backend_client::HttpBackendConfig;
use frame_capture::CaptureConfig;
use lifecycle::LifecycleConfig;
use serde::{Deserialize, Serialize};

/// Session and event identification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub course_id: String,
    pub camera_id: String,
    /// Meeting URL reported when opening the session
    pub meet_url: String,
    /// Meeting title reported when opening the session
    pub title: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            course_id: "CSC4400".to_string(),
            camera_id: "MEET_TAB".to_string(),
            meet_url: String::new(),
            title: String::new(),
        }
    }
}

/// Frame capture cadence and geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Frame grab period (milliseconds)
    pub interval_ms: u64,
    pub min_width: u32,
    pub min_height: u32,
    pub target_size: u32,
    pub jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        let frame = CaptureConfig::default();
        Self {
            interval_ms: 2000,
            min_width: frame.min_width,
            min_height: frame.min_height,
            target_size: frame.target_size,
            jpeg_quality: frame.jpeg_quality,
        }
    }
}

impl CaptureSettings {
    pub fn frame_config(&self) -> CaptureConfig {
        CaptureConfig {
            min_width: self.min_width,
            min_height: self.min_height,
            target_size: self.target_size,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

/// Identify call gating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifySettings {
    /// Minimum spacing between identify attempts (milliseconds)
    pub interval_ms: u64,
    /// How long a stored identity is trusted before re-verification
    /// (milliseconds)
    pub reidentify_interval_ms: u64,
    /// Whether `stop()` forgets the recognized identity
    pub clear_identity_on_stop: bool,
}

impl Default for IdentifySettings {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            reidentify_interval_ms: 60_000,
            clear_identity_on_stop: true,
        }
    }
}

/// Infer call gating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferSettings {
    /// Minimum spacing between infer calls (milliseconds)
    pub interval_ms: u64,
}

impl Default for InferSettings {
    fn default() -> Self {
        Self { interval_ms: 3000 }
    }
}

/// Idle accounting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleSettings {
    /// Completed increment reported to the backend (seconds)
    pub report_step_secs: u64,
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            report_step_secs: 10,
        }
    }
}

/// Full configuration tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: HttpBackendConfig,
    pub session: SessionSettings,
    pub capture: CaptureSettings,
    pub identify: IdentifySettings,
    pub infer: InferSettings,
    pub idle: IdleSettings,
    pub alert: AlertConfig,
    pub lifecycle: LifecycleConfig,
}

impl Settings {
    /// Load from `classync.toml` (optional) and `CLASSYNC_*` environment
    /// variables, on top of the defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("classync").required(false))
            .add_source(
                config::Environment::with_prefix("CLASSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
