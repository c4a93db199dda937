//! Snip orchestration: capture → drag selection → crop → search.
//!
//! `SnipController` is the explicit state a host's event handlers share:
//! the captured raster and the one selection session drawn over it. The
//! host feeds it pointer events and decides when to crop or search.
//!
//! Every snip starts from a fresh capture. A crop consumes the raster
//! whether or not it succeeds, so a failed attempt leaves nothing behind
//! and the user retries the whole gesture.

use crate::capture::{
    self, CaptureError, CaptureSource, CropError, CropOptions, EncodedImage, Point, SelectionError,
    SelectionRect, SelectionSession, SelectionSlot, ViewportRaster,
};
use crate::search::{Product, SearchError, VisualSearchClient};
use crate::settings::SnipSettings;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SnipError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("No capture in progress, start a snip first")]
    NoCapture,
}

#[derive(Debug, Default)]
pub struct SnipController {
    options: CropOptions,
    raster: Option<Arc<ViewportRaster>>,
    selections: SelectionSlot,
}

impl SnipController {
    pub fn new(options: CropOptions) -> Self {
        Self {
            options,
            raster: None,
            selections: SelectionSlot::new(),
        }
    }

    pub fn from_settings(settings: &SnipSettings) -> Self {
        Self::new(settings.crop_options())
    }

    pub fn options(&self) -> &CropOptions {
        &self.options
    }

    /// Capture the viewport and open a selection session over it.
    ///
    /// Any unfinished session is cancelled first, even if the capture
    /// then fails. Returns the new session's id.
    pub fn start(&mut self, source: &dyn CaptureSource) -> Result<u64, SnipError> {
        self.cancel();
        let start = std::time::Instant::now();
        let raster = source.capture().map_err(|e| {
            log::error!("[CAPTURE] Capture failed: {}", e);
            e
        })?;
        log::info!(
            "[CAPTURE] Viewport captured in {}ms",
            start.elapsed().as_millis()
        );
        Ok(self.start_with_raster(raster))
    }

    /// Open a selection session over an already captured raster.
    pub fn start_with_raster(&mut self, raster: ViewportRaster) -> u64 {
        let display = raster.display_size();
        self.raster = Some(Arc::new(raster));
        let (session, _previous) = self.selections.begin(display);
        session.id()
    }

    pub fn session(&self) -> Option<&SelectionSession> {
        self.selections.current()
    }

    pub fn has_capture(&self) -> bool {
        self.raster.is_some()
    }

    pub fn pointer_down(&mut self, at: Point) -> Result<SelectionRect, SnipError> {
        Ok(self.active_session()?.anchor(at)?)
    }

    pub fn pointer_move(&mut self, at: Point) -> Result<SelectionRect, SnipError> {
        Ok(self.active_session()?.update(at)?)
    }

    /// Finish the drag. `None` means the user made no selection; the
    /// capture is dropped and a new snip has to be started.
    pub fn pointer_up(&mut self) -> Result<Option<SelectionRect>, SnipError> {
        let rect = self.active_session()?.finalize();
        match rect {
            Some(r) => log::info!(
                "[SELECT] Selection {:.0}x{:.0} at {:.0},{:.0}",
                r.width, r.height, r.left, r.top
            ),
            None => {
                log::info!("[SELECT] Empty drag, no selection");
                self.raster = None;
            }
        }
        Ok(rect)
    }

    /// Abandon the current snip, if any.
    pub fn cancel(&mut self) {
        if self.selections.cancel() {
            log::info!("[SELECT] Snip cancelled");
        }
        self.raster = None;
    }

    /// Crop the finalized selection and encode it.
    ///
    /// Fails without touching the snip while the drag is still running.
    /// Once the selection is finalized, both it and the capture are
    /// consumed, whatever the outcome of the encode.
    pub fn crop(&mut self) -> Result<EncodedImage, SnipError> {
        let (raster, rect) = self.take_selection()?;
        Ok(capture::crop_and_encode(&raster, &rect, &self.options)?)
    }

    /// Same as `crop`, with the encode moved off the calling thread.
    pub async fn crop_in_background(&mut self) -> Result<EncodedImage, SnipError> {
        let (raster, rect) = self.take_selection()?;
        Ok(capture::crop_and_encode_in_background(raster, rect, self.options).await?)
    }

    /// Crop the finalized selection and search for products that match it.
    pub async fn search(
        &mut self,
        client: &VisualSearchClient,
        token: &str,
    ) -> Result<Vec<Product>, SnipError> {
        let image = self.crop_in_background().await?;
        Ok(client.search_by_upload(token, &image).await?)
    }

    fn take_selection(&mut self) -> Result<(Arc<ViewportRaster>, SelectionRect), SnipError> {
        if self.raster.is_none() {
            return Err(SnipError::NoCapture);
        }
        let session = self.selections.current().ok_or(SnipError::NoCapture)?;
        let rect = session.finalized_rect()?;

        if let Some(session) = self.selections.take() {
            log::debug!("[SELECT] Session #{} consumed by crop", session.id());
        }
        let raster = self.raster.take().ok_or(SnipError::NoCapture)?;
        let rect = rect.ok_or(CropError::EmptySelection)?;
        Ok((raster, rect))
    }

    fn active_session(&mut self) -> Result<&mut SelectionSession, SnipError> {
        if self.raster.is_none() {
            return Err(SnipError::NoCapture);
        }
        self.selections.current_mut().ok_or(SnipError::NoCapture)
    }
}
