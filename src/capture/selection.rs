//! Drag-to-select state machine.
//!
//! One `SelectionSession` per capture:
//!
//!   Idle → Anchored (pointer-down) → Updating (pointer-move, self-loop)
//!        → Finalized (pointer-up) | Cancelled (explicit cancel)
//!
//! `Finalized` and `Cancelled` are terminal. The session is a plain value
//! owned by whoever handles the pointer events; `SelectionSlot` keeps at
//! most one of them alive.

use super::geometry::{DisplaySize, Point, SelectionRect};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Anchored,
    Updating,
    Finalized,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Finalized | SessionState::Cancelled)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Anchored => "anchored",
            SessionState::Updating => "updating",
            SessionState::Finalized => "finalized",
            SessionState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Selection has no anchor yet; press the pointer first")]
    NotAnchored,

    #[error("Selection session is already {0}; start a new snip")]
    Closed(SessionState),

    #[error("Selection is still {0}; release the pointer first")]
    NotFinalized(SessionState),
}

/// A single drag gesture over one viewport raster.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    id: u64,
    display: DisplaySize,
    state: SessionState,
    anchor: Option<Point>,
    rect: Option<SelectionRect>,
}

impl SelectionSession {
    /// Start an idle session over a raster shown at `display` size.
    pub fn new(id: u64, display: DisplaySize) -> Self {
        Self {
            id,
            display,
            state: SessionState::Idle,
            anchor: None,
            rect: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    pub fn anchor_point(&self) -> Option<Point> {
        self.anchor
    }

    /// Current rectangle, if the pointer has gone down.
    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    /// True while pointer events can still change the selection.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Pointer-down: fix the anchor. Pressing again mid-drag restarts
    /// the drag from the new point.
    pub fn anchor(&mut self, at: Point) -> Result<SelectionRect, SelectionError> {
        self.ensure_open()?;
        let rect = SelectionRect::at(at);
        self.anchor = Some(at);
        self.rect = Some(rect);
        self.state = SessionState::Anchored;
        Ok(rect)
    }

    /// Pointer-move: recompute the rectangle between the anchor and `to`.
    ///
    /// Depends only on the anchor and `to`, so repeated calls with the
    /// same position always produce the same rectangle.
    pub fn update(&mut self, to: Point) -> Result<SelectionRect, SelectionError> {
        self.ensure_open()?;
        let anchor = self.anchor.ok_or(SelectionError::NotAnchored)?;
        let rect = SelectionRect::from_corners(anchor, to);
        self.rect = Some(rect);
        self.state = SessionState::Updating;
        Ok(rect)
    }

    /// Pointer-up: end the session.
    ///
    /// Returns `None` for a zero-area drag, a press that never happened,
    /// or a cancelled session. None of those is an error: the user simply
    /// made no selection.
    pub fn finalize(&mut self) -> Option<SelectionRect> {
        match self.state {
            SessionState::Cancelled => return None,
            SessionState::Finalized => {}
            _ => self.state = SessionState::Finalized,
        }
        self.rect.filter(|r| !r.is_degenerate())
    }

    /// The rectangle a finished drag produced, ready to crop.
    ///
    /// `Ok(None)` is a finalized session with no selection in it.
    pub fn finalized_rect(&self) -> Result<Option<SelectionRect>, SelectionError> {
        match self.state {
            SessionState::Finalized => Ok(self.rect.filter(|r| !r.is_degenerate())),
            SessionState::Cancelled => Err(SelectionError::Closed(self.state)),
            state => Err(SelectionError::NotFinalized(state)),
        }
    }

    /// Abandon the session. Returns false if it had already ended.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = SessionState::Cancelled;
        true
    }

    fn ensure_open(&self) -> Result<(), SelectionError> {
        if self.state.is_terminal() {
            return Err(SelectionError::Closed(self.state));
        }
        Ok(())
    }
}

/// Holder for the one selection session that may be active at a time.
#[derive(Debug, Default)]
pub struct SelectionSlot {
    next_id: u64,
    current: Option<SelectionSession>,
}

impl SelectionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new session, cancelling the previous one if it was still
    /// running. The superseded session is handed back to the caller.
    pub fn begin(&mut self, display: DisplaySize) -> (&mut SelectionSession, Option<SelectionSession>) {
        self.next_id += 1;
        let previous = self.current.take().map(|mut old| {
            if old.cancel() {
                log::info!(
                    "[SELECT] Session #{} cancelled by new session #{}",
                    old.id(),
                    self.next_id
                );
            }
            old
        });
        log::debug!(
            "[SELECT] Session #{} started over {:.0}x{:.0} display",
            self.next_id,
            display.width,
            display.height
        );
        let session = self.current.insert(SelectionSession::new(self.next_id, display));
        (session, previous)
    }

    pub fn current(&self) -> Option<&SelectionSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut SelectionSession> {
        self.current.as_mut()
    }

    /// Cancel the current session, if any is still running.
    pub fn cancel(&mut self) -> bool {
        self.current.as_mut().map(SelectionSession::cancel).unwrap_or(false)
    }

    pub fn take(&mut self) -> Option<SelectionSession> {
        self.current.take()
    }
}
