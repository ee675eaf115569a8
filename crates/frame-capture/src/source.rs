//! Video source traits and selection

use crate::frame::RawFrame;
use crate::{CaptureConfig, CaptureError};
use tracing::{info, warn};

/// Where a frame source comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A video surface provided by the conference page
    Conference,
    /// A locally opened camera stream
    FallbackCamera,
}

/// Descriptor for a candidate video surface
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Provider-scoped surface identifier
    pub id: String,
    /// Current surface width in pixels
    pub width: u32,
    /// Current surface height in pixels
    pub height: u32,
}

impl SourceInfo {
    /// Pixel area used for source ranking
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// An opened video source frames can be grabbed from.
///
/// `grab` returns `CaptureError::NotReady` while the source has no real
/// pixels yet; the caller skips that tick. `release` frees any device the
/// source holds — conference surfaces are owned by the page and must not
/// be closed, so only fallback cameras do real work here.
pub trait FrameSource: Send {
    fn kind(&self) -> SourceKind;

    fn grab(&mut self) -> Result<RawFrame, CaptureError>;

    fn release(&mut self) {}
}

/// Enumerates conference surfaces and opens sources
pub trait SourceProvider: Send {
    /// Currently visible conference video surfaces
    fn surfaces(&self) -> Vec<SourceInfo>;

    /// Open a conference surface by id
    fn open_surface(&self, id: &str) -> Result<Box<dyn FrameSource>, CaptureError>;

    /// Open the local fallback camera
    fn open_fallback(&self) -> Result<Box<dyn FrameSource>, CaptureError>;
}

/// Pick a capture source: the largest conference surface meeting the
/// minimum dimensions, else the fallback camera.
pub fn select_source(
    provider: &dyn SourceProvider,
    config: &CaptureConfig,
) -> Result<Box<dyn FrameSource>, CaptureError> {
    let mut best: Option<SourceInfo> = None;
    for info in provider.surfaces() {
        if info.width < config.min_width || info.height < config.min_height {
            continue;
        }
        if best.as_ref().map_or(true, |b| info.area() > b.area()) {
            best = Some(info);
        }
    }

    if let Some(info) = best {
        info!(
            "Using conference surface {} ({}x{})",
            info.id, info.width, info.height
        );
        return provider.open_surface(&info.id);
    }

    warn!("No qualifying conference surface, opening fallback camera");
    provider.open_fallback()
}

/// Synthetic camera source producing gradient frames.
///
/// Stands in for a real capture device in headless runs and tests; the
/// first `warmup_grabs` grabs report not-ready, the way a real element
/// does before its stream attaches.
pub struct MockCameraSource {
    kind: SourceKind,
    width: u32,
    height: u32,
    warmup_grabs: u32,
    sequence: u32,
    released: bool,
}

impl MockCameraSource {
    pub fn new(kind: SourceKind, width: u32, height: u32) -> Self {
        Self {
            kind,
            width,
            height,
            warmup_grabs: 0,
            sequence: 0,
            released: false,
        }
    }

    /// Report not-ready for the first `grabs` grabs
    pub fn with_warmup(mut self, grabs: u32) -> Self {
        self.warmup_grabs = grabs;
        self
    }

    /// Whether `release` has been called
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for MockCameraSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn grab(&mut self) -> Result<RawFrame, CaptureError> {
        if self.warmup_grabs > 0 {
            self.warmup_grabs -= 1;
            return Err(CaptureError::NotReady);
        }

        self.sequence = self.sequence.wrapping_add(1);
        let (w, h) = (self.width, self.height);
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                // Shifting gradient so consecutive frames differ
                data.push(((x + self.sequence) % 256) as u8);
                data.push((y % 256) as u8);
                data.push(((x + y) % 256) as u8);
            }
        }
        Ok(RawFrame::new(data, w, h, self.sequence as u64 * 33, self.sequence))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Mock provider with a configurable surface list and deniable camera
pub struct MockSurfaceProvider {
    surfaces: Vec<SourceInfo>,
    camera_available: bool,
}

impl MockSurfaceProvider {
    pub fn new(surfaces: Vec<SourceInfo>) -> Self {
        Self {
            surfaces,
            camera_available: true,
        }
    }

    /// Provider with no surfaces and a working camera
    pub fn camera_only() -> Self {
        Self::new(Vec::new())
    }

    /// Simulate camera permission denial
    pub fn deny_camera(mut self) -> Self {
        self.camera_available = false;
        self
    }
}

impl SourceProvider for MockSurfaceProvider {
    fn surfaces(&self) -> Vec<SourceInfo> {
        self.surfaces.clone()
    }

    fn open_surface(&self, id: &str) -> Result<Box<dyn FrameSource>, CaptureError> {
        let info = self
            .surfaces
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CaptureError::Open(format!("unknown surface {id}")))?;
        Ok(Box::new(MockCameraSource::new(
            SourceKind::Conference,
            info.width,
            info.height,
        )))
    }

    fn open_fallback(&self) -> Result<Box<dyn FrameSource>, CaptureError> {
        if !self.camera_available {
            return Err(CaptureError::PermissionDenied(
                "camera access denied".to_string(),
            ));
        }
        Ok(Box::new(MockCameraSource::new(
            SourceKind::FallbackCamera,
            640,
            480,
        )))
    }
}
