//! Backend Transport
//!
//! Wire types for the engagement backend's REST surface and the
//! `BackendClient` trait the rest of the pipeline talks through. The
//! production implementation relays over HTTP with a bypass header; tests
//! and headless runs inject their own.

pub mod http;
pub mod wire;

pub use http::{HttpBackend, HttpBackendConfig};
pub use wire::{
    Bbox, EngagementEvent, EventPayload, IdentifyResponse, InferResponse, SessionRequest,
    SessionResponse, SignalKind,
};

use frame_capture::JpegFrame;
use thiserror::Error;

/// Backend transport error types
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Backend rejected request: HTTP {0}")]
    Status(u16),
}

/// Logical requests the capture pipeline issues.
///
/// The pipeline does not care how these reach the network; the deployed
/// product routes them through an extension relay, tests use in-process
/// fakes.
#[async_trait::async_trait]
pub trait BackendClient: Send + Sync {
    /// Resolve (or create) the session record for this meeting
    async fn open_session(&self, req: &SessionRequest) -> Result<SessionResponse, BackendError>;

    /// Submit a frame for face identification
    async fn identify(
        &self,
        frame: &JpegFrame,
        camera_id: &str,
        session_id: Option<&str>,
    ) -> Result<IdentifyResponse, BackendError>;

    /// Submit a frame for attentiveness inference
    async fn infer(
        &self,
        frame: &JpegFrame,
        camera_id: &str,
        session_id: Option<&str>,
    ) -> Result<InferResponse, BackendError>;

    /// Post an engagement event
    async fn post_event(&self, event: &EngagementEvent) -> Result<(), BackendError>;

    /// Best-effort session stop; response ignored beyond logging
    async fn close_session(&self, session_id: &str) -> Result<(), BackendError>;
}
