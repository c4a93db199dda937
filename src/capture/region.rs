//! Region cropping logic, the functional core of a snip.
//!
//! Takes a raster and a selection in, returns JPEG bytes out. Only the
//! background wrapper touches the async runtime.

use super::geometry::{output_dimensions, SelectionRect, SourceRegion};
use super::ViewportRaster;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::sync::Arc;

pub const DEFAULT_MAX_DIMENSION: u32 = 800;
pub const DEFAULT_QUALITY: f32 = 0.8;

const JPEG_MIME: &str = "image/jpeg";

/// Output policy for a crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropOptions {
    /// Bound on the longer output side, in pixels.
    pub max_dimension: u32,
    /// JPEG quality in `(0, 1]`.
    pub quality: f32,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CropOptions {
    /// Quality on the encoder's 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        if !self.quality.is_finite() {
            return (DEFAULT_QUALITY * 100.0) as u8;
        }
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// A crop ready to attach to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Output size in pixels: `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:image/jpeg;base64,...`, the form a browser canvas hands out.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", JPEG_MIME, self.to_base64())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Selection is empty or lies outside the captured screen")]
    EmptySelection,

    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Crops the selection out of the raster, bounds its size, and encodes it.
///
/// `rect` is in displayed coordinates; it is mapped into raster pixels,
/// clamped to the raster, downscaled so the longer side fits
/// `options.max_dimension` (never upscaled), and encoded as JPEG.
pub fn crop_and_encode(
    raster: &ViewportRaster,
    rect: &SelectionRect,
    options: &CropOptions,
) -> Result<EncodedImage, CropError> {
    let start = std::time::Instant::now();

    if rect.is_degenerate() {
        return Err(CropError::EmptySelection);
    }

    let (img_width, img_height) = raster.pixel_size();
    let scale = raster.scale_factors();
    let region = SourceRegion::from_selection(rect, scale);
    let clamped = region
        .clamp_to(img_width, img_height)
        .ok_or(CropError::EmptySelection)?;
    if clamped != region {
        log::debug!(
            "[CROP] Selection clamped to raster: ({:.1},{:.1} {:.1}x{:.1}) -> ({:.1},{:.1} {:.1}x{:.1})",
            region.x, region.y, region.width, region.height,
            clamped.x, clamped.y, clamped.width, clamped.height
        );
    }

    let (x, y, width, height) = clamped.pixel_bounds(img_width, img_height);
    let (out_width, out_height) = output_dimensions(width, height, options.max_dimension);

    // JPEG has no alpha channel
    let cropped = raster.image().crop_imm(x, y, width, height).to_rgb8();
    let output = if (out_width, out_height) == (width, height) {
        cropped
    } else {
        image::imageops::resize(&cropped, out_width, out_height, FilterType::Triangle)
    };

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, options.jpeg_quality());
    DynamicImage::ImageRgb8(output)
        .write_with_encoder(encoder)
        .map_err(|e| CropError::EncodingFailed(e.to_string()))?;
    if bytes.is_empty() {
        return Err(CropError::EncodingFailed("encoder produced no bytes".into()));
    }

    log::info!(
        "[CROP] {}x{} at {},{} (scale {:.2}x{:.2}) -> {}x{} JPEG q{} in {}ms, {} bytes",
        width,
        height,
        x,
        y,
        scale.sx,
        scale.sy,
        out_width,
        out_height,
        options.jpeg_quality(),
        start.elapsed().as_millis(),
        bytes.len()
    );

    Ok(EncodedImage {
        bytes,
        width: out_width,
        height: out_height,
    })
}

/// Runs `crop_and_encode` on tokio's blocking pool.
///
/// Dropping the returned future does not stop the encode; the work runs
/// to completion and its result is discarded.
pub async fn crop_and_encode_in_background(
    raster: Arc<ViewportRaster>,
    rect: SelectionRect,
    options: CropOptions,
) -> Result<EncodedImage, CropError> {
    tokio::task::spawn_blocking(move || crop_and_encode(&raster, &rect, &options))
        .await
        .map_err(|e| CropError::EncodingFailed(format!("encode task failed: {}", e)))?
}
