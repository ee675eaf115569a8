//! Frame Capture Library for Engagement Monitoring
//!
//! Provides video source selection and per-frame processing:
//! - Conference video surface picking (largest qualifying surface)
//! - Local camera fallback when no surface qualifies
//! - Center-crop, downscale, and JPEG encoding of captured frames

pub mod frame;
pub mod processor;
pub mod source;

pub use frame::{JpegFrame, RawFrame};
pub use processor::FrameProcessor;
pub use source::{
    select_source, FrameSource, MockCameraSource, MockSurfaceProvider, SourceInfo, SourceKind,
    SourceProvider,
};

use thiserror::Error;

/// Capture error types
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No video source available")]
    NoSource,

    #[error("Camera access denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to open source: {0}")]
    Open(String),

    #[error("Source not ready")]
    NotReady,

    #[error("Frame encoding failed: {0}")]
    Encode(String),
}

/// Capture configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Minimum surface width to qualify as a capture source
    pub min_width: u32,
    /// Minimum surface height to qualify as a capture source
    pub min_height: u32,
    /// Side length of the square frame sent to the backend
    pub target_size: u32,
    /// JPEG quality (0-100)
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_width: 200,
            min_height: 150,
            target_size: 512,
            jpeg_quality: 80,
        }
    }
}
