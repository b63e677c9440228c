//! Everything the service keeps between events, in one owned struct.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::managers::record_store::TabRecordStore;
use crate::managers::window_tracker::{WindowTracker, WindowTrackerTrait};
use crate::services::ordering_engine::compute_ordering_state;
use crate::types::ordering::OrderingState;

/// Mutable service state. Created at startup, reset when the tracked window goes away.
#[derive(Debug, Default)]
pub struct BackgroundState {
    pub records: TabRecordStore,
    pub window: WindowTracker,
    pub ordering: OrderingState,
    /// Signature of the last snapshot handed to the UI.
    pub last_broadcast_signature: Option<String>,
}

impl BackgroundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derives `ordering` from the current records.
    pub fn recompute_ordering(&mut self) -> &OrderingState {
        self.ordering = compute_ordering_state(self.records.records());
        &self.ordering
    }

    /// Drops tracking, records and the broadcast signature.
    pub fn reset(&mut self) {
        self.window.clear();
        self.records.clear();
        self.last_broadcast_signature = None;
        self.recompute_ordering();
    }
}

/// Shared handle. Never hold the guard across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<BackgroundState>>);

impl SharedState {
    pub fn new(state: BackgroundState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Locks the state. A poisoned lock is recovered; every mutation leaves
    /// the records structurally valid.
    pub fn lock(&self) -> MutexGuard<'_, BackgroundState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
