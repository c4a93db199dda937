//! Viewport raster acquisition.
//!
//! Two ways in: a browser tab capture handed over as a data URL, or
//! (with the `screen-capture` feature) a direct grab of the primary
//! monitor through xcap.

use super::{CaptureError, DisplaySize, ViewportRaster};
use base64::Engine;

/// Decode a `data:image/...;base64,` URL into a viewport raster.
///
/// This is the form a browser tab capture arrives in. `display` is the
/// size the capture is shown at in the selection preview.
pub fn decode_data_url(data_url: &str, display: DisplaySize) -> Result<ViewportRaster, CaptureError> {
    let start = std::time::Instant::now();

    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| CaptureError::Unavailable("capture is not a data URL".into()))?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err(CaptureError::Unavailable(format!(
            "unsupported capture header: {}",
            header
        )));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CaptureError::Unavailable(format!("capture payload is not base64: {}", e)))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| CaptureError::Unavailable(format!("capture could not be decoded: {}", e)))?;

    log::info!(
        "[CAPTURE] Decoded {}x{} capture ({} bytes) in {}ms",
        image.width(),
        image.height(),
        bytes.len(),
        start.elapsed().as_millis()
    );

    ViewportRaster::new(image, display)
}

/// Capture the primary monitor.
///
/// The raster comes back in physical pixels; its displayed size is the
/// monitor's logical size, so HiDPI scaling shows up in the scale factors.
#[cfg(feature = "screen-capture")]
pub fn capture_primary_monitor() -> Result<ViewportRaster, CaptureError> {
    use xcap::Monitor;

    let start = std::time::Instant::now();
    let unavailable = |e: xcap::XCapError| CaptureError::Unavailable(e.to_string());

    let monitors = Monitor::all().map_err(unavailable)?;
    let monitor = monitors
        .iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or_else(|| monitors.first())
        .ok_or_else(|| CaptureError::Unavailable("no monitors found".into()))?;

    let scale = monitor.scale_factor().map_err(unavailable)? as f64;
    let rgba = monitor.capture_image().map_err(unavailable)?;
    let (width, height) = (rgba.width(), rgba.height());

    log::info!(
        "[CAPTURE] Primary monitor {}x{} (scale {:.2}) in {}ms",
        width,
        height,
        scale,
        start.elapsed().as_millis()
    );

    let scale = if scale > 0.0 { scale } else { 1.0 };
    let display = DisplaySize::new(width as f64 / scale, height as f64 / scale);
    ViewportRaster::new(image::DynamicImage::ImageRgba8(rgba), display)
}

/// `CaptureSource` backed by the primary monitor.
#[cfg(feature = "screen-capture")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryMonitor;

#[cfg(feature = "screen-capture")]
impl super::CaptureSource for PrimaryMonitor {
    fn capture(&self) -> Result<ViewportRaster, CaptureError> {
        capture_primary_monitor()
    }
}
