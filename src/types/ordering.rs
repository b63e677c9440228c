use serde::{Deserialize, Serialize};

use super::tab::TabId;

/// Readiness counters consumed by the status UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessMetrics {
    pub total_watch_tabs_in_window: usize,
    pub watch_tabs_ready_count: usize,
    pub hidden_tabs_may_have_stale_remaining: bool,
    pub ready_tabs_are_contiguous: bool,
    pub ready_tabs_are_at_front: bool,
    pub known_watch_tabs_out_of_order: bool,
    pub all_known: bool,
    pub computed_all_sorted: bool,
}

impl Default for ReadinessMetrics {
    fn default() -> Self {
        Self {
            total_watch_tabs_in_window: 0,
            watch_tabs_ready_count: 0,
            hidden_tabs_may_have_stale_remaining: false,
            ready_tabs_are_contiguous: true,
            ready_tabs_are_at_front: true,
            known_watch_tabs_out_of_order: false,
            all_known: false,
            computed_all_sorted: false,
        }
    }
}

/// Ordering derived from the record store. Never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderingState {
    /// Every record by tab index, pinned and live tabs included.
    pub current_order: Vec<TabId>,
    /// Known remaining times ascending, then unknown ones in current order.
    pub target_order: Vec<TabId>,
    pub is_fully_sorted: bool,
    pub readiness_metrics: ReadinessMetrics,
}
