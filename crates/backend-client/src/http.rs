//! HTTP implementation of the backend transport

use crate::wire::{
    EngagementEvent, IdentifyResponse, InferResponse, SessionRequest, SessionResponse,
};
use crate::{BackendClient, BackendError};
use frame_capture::JpegFrame;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info};

/// The relay in front of the backend requires this header to skip its
/// browser interstitial.
const BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

/// HTTP backend configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HttpBackendConfig {
    /// Backend origin, e.g. "https://hannbella-classync.hf.space"
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".to_string(),
            timeout_secs: 15,
        }
    }
}

/// reqwest-based backend client
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &HttpBackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("Backend client targeting {}", base_url);

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .post(self.url(path))
            .header(BYPASS_HEADER, "1")
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        resp.json::<R>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn post_frame<R>(
        &self,
        path: &str,
        frame: &JpegFrame,
        camera_id: &str,
        session_id: Option<&str>,
    ) -> Result<R, BackendError>
    where
        R: serde::de::DeserializeOwned,
    {
        let part = Part::bytes(frame.data.clone())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("frame", part)
            .text("camera_id", camera_id.to_string());

        let mut req = self
            .client
            .post(self.url(path))
            .header(BYPASS_HEADER, "1")
            .multipart(form);
        if let Some(sid) = session_id {
            req = req.query(&[("session_id", sid)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        resp.json::<R>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl BackendClient for HttpBackend {
    async fn open_session(&self, req: &SessionRequest) -> Result<SessionResponse, BackendError> {
        debug!("Opening session for course {}", req.course_id);
        self.post_json("/api/auto/session_from_meet", req).await
    }

    async fn identify(
        &self,
        frame: &JpegFrame,
        camera_id: &str,
        session_id: Option<&str>,
    ) -> Result<IdentifyResponse, BackendError> {
        self.post_frame("/api/identify", frame, camera_id, session_id)
            .await
    }

    async fn infer(
        &self,
        frame: &JpegFrame,
        camera_id: &str,
        session_id: Option<&str>,
    ) -> Result<InferResponse, BackendError> {
        self.post_frame("/api/infer", frame, camera_id, session_id)
            .await
    }

    async fn post_event(&self, event: &EngagementEvent) -> Result<(), BackendError> {
        let _: serde_json::Value = self.post_json("/api/events", event).await?;
        Ok(())
    }

    async fn close_session(&self, session_id: &str) -> Result<(), BackendError> {
        let body = serde_json::json!({ "session_id": session_id });
        let _: serde_json::Value = self.post_json("/stop", &body).await?;
        Ok(())
    }
}
