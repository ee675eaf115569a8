//! Classync Monitor - Main Entry Point
//!
//! Headless runner: captures from the mock provider (or the fallback
//! camera path) and talks to a real backend. Host integrations embed
//! `MonitorController` with their own source provider, probe, and
//! overlay instead.

use alerting::ToneAlert;
use backend_client::HttpBackend;
use frame_capture::MockSurfaceProvider;
use lifecycle::{MemoryIntentStore, StaticProbe};
use monitor::{init_logging, MonitorController, Settings, TracingOverlay};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let settings = Settings::load()?;
    info!("=== Classync Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Course {}, backend {}", settings.session.course_id, settings.backend.base_url);

    let backend = Arc::new(HttpBackend::new(&settings.backend)?);
    let alert = ToneAlert::new(&settings.alert);

    let (controller, handle) = MonitorController::new(
        settings,
        backend,
        Box::new(MockSurfaceProvider::camera_only()),
        Box::new(StaticProbe(true)),
        Box::new(MemoryIntentStore::new()),
        Box::new(TracingOverlay::new()),
        Box::new(alert),
    );

    let task = tokio::spawn(controller.run());

    handle.start().await;
    info!("Monitoring; ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    handle.stop().await;
    handle.shutdown();
    task.await?;

    Ok(())
}
