//! Screen context acquisition.
//!
//! The actual screenshot mechanism is a platform collaborator injected via
//! `ScreenSource`; this module owns the downsampling step that keeps vision
//! requests small enough for slow endpoints.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// Vision payloads are resized to at most this width before upload.
pub const MAX_UPLOAD_WIDTH: u32 = 448;
const JPEG_QUALITY: u8 = 60;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("screen acquisition failed: {0}")]
    Acquisition(String),

    #[error("captured image could not be processed: {0}")]
    Image(#[from] image::ImageError),
}

/// Produces a full-resolution screen snapshot on demand. Implemented by the
/// platform shell (ScreenCaptureKit on macOS); tests inject fakes.
#[async_trait]
pub trait ScreenSource: Send + Sync {
    /// Returns encoded image bytes for the active display.
    async fn capture(&self) -> Result<Vec<u8>, CaptureError>;
}

/// Downsamples a captured frame to [`MAX_UPLOAD_WIDTH`] (preserving aspect
/// ratio) and re-encodes it as JPEG for transmission.
pub fn prepare_for_upload(image_bytes: &[u8]) -> Result<Vec<u8>, CaptureError> {
    let img = image::load_from_memory(image_bytes)?;

    let img = if img.width() > MAX_UPLOAD_WIDTH {
        let ratio = f64::from(MAX_UPLOAD_WIDTH) / f64::from(img.width());
        let height = (f64::from(img.height()) * ratio).round().max(1.0) as u32;
        img.resize_exact(MAX_UPLOAD_WIDTH, height, FilterType::Triangle)
    } else {
        img
    };

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    img.write_with_encoder(encoder)?;
    Ok(jpeg)
}
