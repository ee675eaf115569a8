//! Lazily created, memoized backend session

use backend_client::{BackendClient, SessionRequest};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Resolves and memoizes the backend session id for this page visit.
///
/// The first caller that needs a session id creates it; concurrent
/// callers wait on the same creation instead of racing duplicate
/// `session_from_meet` posts. The id is reused for every event until
/// `invalidate` on explicit stop.
pub struct SessionTracker {
    backend: Arc<dyn BackendClient>,
    request: SessionRequest,
    current: RwLock<Option<String>>,
    creating: Mutex<()>,
}

impl SessionTracker {
    pub fn new(backend: Arc<dyn BackendClient>, request: SessionRequest) -> Self {
        Self {
            backend,
            request,
            current: RwLock::new(None),
            creating: Mutex::new(()),
        }
    }

    /// Non-blocking peek at the memoized id
    pub fn current(&self) -> Option<String> {
        self.current.read().ok().and_then(|g| g.clone())
    }

    /// Return the session id, creating it on first need.
    ///
    /// `None` means the backend could not mint one; callers drop their
    /// report and the next caller tries again.
    pub async fn ensure(&self) -> Option<String> {
        if let Some(sid) = self.current() {
            return Some(sid);
        }

        let _guard = self.creating.lock().await;
        // Another caller may have finished while we waited
        if let Some(sid) = self.current() {
            return Some(sid);
        }

        match self.backend.open_session(&self.request).await {
            Ok(resp) if resp.ok && resp.session_id.is_some() => {
                let sid = resp.session_id.unwrap_or_default();
                info!("Session id: {}", sid);
                if let Ok(mut slot) = self.current.write() {
                    *slot = Some(sid.clone());
                }
                Some(sid)
            }
            Ok(resp) => {
                warn!("Session creation refused (ok={})", resp.ok);
                None
            }
            Err(e) => {
                warn!("Session creation failed: {}", e);
                None
            }
        }
    }

    /// Clear the memoized id, returning it for the best-effort stop call
    pub fn invalidate(&self) -> Option<String> {
        self.current.write().ok().and_then(|mut g| g.take())
    }
}
