//! Which browser window the service is operating on.
//!
//! Every window-scoped operation resolves through here before touching the
//! record store, so tabs from a second open window never leak in.

use crate::types::tab::{is_valid_window_id, WindowId};

/// Trait defining the window tracking interface.
pub trait WindowTrackerTrait {
    fn resolve(&mut self, candidate: Option<WindowId>, force: bool) -> Option<WindowId>;
    fn tracked_window_id(&self) -> Option<WindowId>;
    fn clear(&mut self);
    fn is_tracked(&self, window_id: WindowId) -> bool;
    fn accepts(&self, window_id: Option<WindowId>) -> bool;
}

/// Holds the tracked window id, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowTracker {
    tracked: Option<WindowId>,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self { tracked: None }
    }
}

impl WindowTrackerTrait for WindowTracker {
    /// Adopts `candidate` when it is a valid id and either `force` is set or
    /// nothing is tracked yet. A forced `None` clears tracking. Returns the
    /// tracked id after the update.
    fn resolve(&mut self, candidate: Option<WindowId>, force: bool) -> Option<WindowId> {
        match candidate {
            Some(id) if is_valid_window_id(id) => {
                if force || self.tracked.is_none() {
                    self.tracked = Some(id);
                }
            }
            None if force => self.tracked = None,
            _ => {}
        }
        self.tracked
    }

    fn tracked_window_id(&self) -> Option<WindowId> {
        self.tracked
    }

    fn clear(&mut self) {
        self.tracked = None;
    }

    fn is_tracked(&self, window_id: WindowId) -> bool {
        self.tracked == Some(window_id)
    }

    /// Events from `window_id` may be processed: nothing is tracked yet, or
    /// the window matches.
    fn accepts(&self, window_id: Option<WindowId>) -> bool {
        match self.tracked {
            None => true,
            Some(tracked) => window_id == Some(tracked),
        }
    }
}
