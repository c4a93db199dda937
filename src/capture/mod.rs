//! Screen capture domain: public API.
//!
//! This module owns the region snip: the captured viewport, the drag
//! selection over it, and the crop that turns both into an uploadable
//! image. External code should only use the items exported here.

pub mod geometry;
mod region;
mod screenshot;
pub mod selection;

pub use geometry::{DisplaySize, Point, ScaleFactors, SelectionRect, SourceRegion};
pub use region::{crop_and_encode, crop_and_encode_in_background, CropError, CropOptions, EncodedImage};
pub use screenshot::decode_data_url;
#[cfg(feature = "screen-capture")]
pub use screenshot::{capture_primary_monitor, PrimaryMonitor};
pub use selection::{SelectionError, SelectionSession, SelectionSlot, SessionState};

use image::DynamicImage;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Screen capture unavailable: {0}")]
    Unavailable(String),

    #[error("Captured image is empty")]
    EmptyRaster,

    #[error("Display size {width}x{height} is not usable")]
    InvalidDisplaySize { width: f64, height: f64 },
}

/// The full captured viewport, held between capture and crop.
///
/// Pairs the raster with the size it is shown at, since the pointer
/// events that define the selection arrive in displayed coordinates.
#[derive(Debug, Clone)]
pub struct ViewportRaster {
    image: DynamicImage,
    display: DisplaySize,
}

impl ViewportRaster {
    pub fn new(image: DynamicImage, display: DisplaySize) -> Result<Self, CaptureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::EmptyRaster);
        }
        if !display.is_usable() {
            return Err(CaptureError::InvalidDisplaySize {
                width: display.width,
                height: display.height,
            });
        }
        Ok(Self { image, display })
    }

    /// A raster displayed one-to-one with its pixels.
    pub fn at_native_size(image: DynamicImage) -> Result<Self, CaptureError> {
        let display = DisplaySize::new(image.width() as f64, image.height() as f64);
        Self::new(image, display)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Raster size in true pixels: `(W_img, H_img)`.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn display_size(&self) -> DisplaySize {
        self.display
    }

    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors::between(self.image.width(), self.image.height(), self.display)
    }
}

/// Anything that can produce a viewport raster on demand.
///
/// The capture itself is a black box: a monitor grab, a decoded browser
/// tab capture, or a canned image in tests.
pub trait CaptureSource {
    fn capture(&self) -> Result<ViewportRaster, CaptureError>;
}

impl<F> CaptureSource for F
where
    F: Fn() -> Result<ViewportRaster, CaptureError>,
{
    fn capture(&self) -> Result<ViewportRaster, CaptureError> {
        self()
    }
}
