//! Center-crop, downscale, and JPEG encoding

use crate::frame::{JpegFrame, RawFrame};
use crate::{CaptureConfig, CaptureError};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, ExtendedColorType, ImageBuffer, Rgb};
use tracing::debug;

/// Renders raw frames into the square JPEG the backend expects
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    target_size: u32,
    jpeg_quality: u8,
}

impl FrameProcessor {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            target_size: config.target_size,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Center-crop to a square, downscale to the target size, and encode.
    pub fn encode(&self, frame: &RawFrame) -> Result<JpegFrame, CaptureError> {
        if !frame.is_ready() {
            return Err(CaptureError::NotReady);
        }

        let img = ImageBuffer::<Rgb<u8>, _>::from_raw(frame.width, frame.height, frame.data.to_vec())
            .ok_or_else(|| CaptureError::Encode("raw buffer does not match dimensions".to_string()))?;

        let side = frame.width.min(frame.height);
        let x = (frame.width - side) / 2;
        let y = (frame.height - side) / 2;
        let cropped = imageops::crop_imm(&img, x, y, side, side).to_image();

        let resized = if side == self.target_size {
            cropped
        } else {
            imageops::resize(
                &cropped,
                self.target_size,
                self.target_size,
                imageops::FilterType::Triangle,
            )
        };

        let mut data = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut data, self.jpeg_quality);
        encoder
            .encode(
                resized.as_raw(),
                self.target_size,
                self.target_size,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        debug!(
            "Encoded {}x{} frame to {} JPEG bytes",
            frame.width,
            frame.height,
            data.len()
        );

        Ok(JpegFrame {
            data,
            captured_at_ms: frame.timestamp_ms,
        })
    }
}
