//! Selection geometry. Pure functions, no pixels.
//!
//! Two coordinate spaces are in play:
//!   - displayed space: CSS pixels of the on-screen preview, where the
//!     pointer events arrive
//!   - image space: true pixels of the captured raster
//!
//! The raster is usually larger than its preview (HiDPI screens, browser
//! zoom), so every selection is mapped through `ScaleFactors` before it
//! touches the raster.

use serde::{Deserialize, Serialize};

/// Pointer position in displayed coordinates.
///
/// May lie outside the viewport: drags routinely overshoot its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen size of the viewport raster, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// User-drawn crop boundary in displayed coordinates.
///
/// Always normalized: `left`/`top` is the minimum corner and the size is
/// never negative, whichever direction the drag went.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Build the normalized rectangle spanned by two corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Zero-size rectangle sitting on a single point.
    pub fn at(p: Point) -> Self {
        Self::from_corners(p, p)
    }

    /// True when the rectangle covers no area (NaN sizes count as empty).
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Ratio between raster pixels and displayed pixels on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactors {
    /// `sx = W_img / W_disp`, `sy = H_img / H_disp`.
    ///
    /// The display size must be usable; `ViewportRaster::new` guarantees it.
    pub fn between(pixel_width: u32, pixel_height: u32, display: DisplaySize) -> Self {
        Self {
            sx: pixel_width as f64 / display.width,
            sy: pixel_height as f64 / display.height,
        }
    }
}

/// A selection mapped into image space. Fractional until it is snapped
/// to whole pixels by `pixel_bounds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRegion {
    pub fn from_selection(rect: &SelectionRect, scale: ScaleFactors) -> Self {
        Self {
            x: rect.left * scale.sx,
            y: rect.top * scale.sy,
            width: rect.width * scale.sx,
            height: rect.height * scale.sy,
        }
    }

    /// Intersect the region with `[0, image_width] x [0, image_height]`.
    ///
    /// Returns `None` when nothing of the region is left inside the raster.
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Option<Self> {
        // f64::max/min drop NaN operands, so non-finite input must stop here
        if ![self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite()) {
            return None;
        }
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = (self.x + self.width).min(image_width as f64);
        let y1 = (self.y + self.height).min(image_height as f64);

        let width = x1 - x0;
        let height = y1 - y0;
        // Negated comparison so NaN collapses too
        if !(width > 0.0 && height > 0.0) {
            return None;
        }

        Some(Self {
            x: x0,
            y: y0,
            width,
            height,
        })
    }

    /// Snap a clamped region outward to whole pixels: `(x, y, width, height)`.
    ///
    /// Never exceeds the raster and never returns a zero side for a region
    /// that `clamp_to` accepted.
    pub fn pixel_bounds(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let max_x = image_width.saturating_sub(1);
        let max_y = image_height.saturating_sub(1);
        let x0 = (self.x.floor().max(0.0) as u32).min(max_x);
        let y0 = (self.y.floor().max(0.0) as u32).min(max_y);
        let x1 = ((self.x + self.width).ceil() as u32).clamp(x0 + 1, image_width.max(1));
        let y1 = ((self.y + self.height).ceil() as u32).clamp(y0 + 1, image_height.max(1));
        (x0, y0, x1 - x0, y1 - y0)
    }
}

/// Output size for a crop of `width x height` pixels.
///
/// Downscales so the longer side equals `max_dimension`, keeping the
/// aspect ratio. Crops already within the bound keep their size: small
/// selections are never upscaled.
pub fn output_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    let longer = width.max(height);
    if longer <= max_dimension {
        return (width, height);
    }

    let ratio = max_dimension as f64 / longer as f64;
    let shrink = |side: u32| ((side as f64 * ratio).round() as u32).clamp(1, max_dimension);
    if width >= height {
        (max_dimension, shrink(height))
    } else {
        (shrink(width), max_dimension)
    }
}
