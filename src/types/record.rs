use serde::{Deserialize, Serialize};

use super::tab::{BrowserTab, TabId, WindowId};

/// Load state of a tracked tab, as far as polling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Unsuspended,
    Suspended,
    Loading,
}

impl TabStatus {
    /// Discarded wins over loading; anything else counts as live.
    pub fn from_tab(tab: &BrowserTab) -> Self {
        if tab.discarded {
            TabStatus::Suspended
        } else if tab.is_loading() {
            TabStatus::Loading
        } else {
            TabStatus::Unsuspended
        }
    }
}

/// Playback details reported by a tab's in-page agent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub title: Option<String>,
    pub length_seconds: Option<f64>,
    /// Seconds left at the current playback rate; `None` means unknown.
    pub remaining_time: Option<f64>,
}

/// Per-tab state for a watch/shorts tab in the tracked window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub window_id: Option<WindowId>,
    pub url: String,
    pub index: Option<i64>,
    pub pinned: bool,
    /// `None` until the first reconcile observes the tab.
    pub status: Option<TabStatus>,
    pub content_script_ready: bool,
    pub metadata_loaded: bool,
    pub is_live_stream: bool,
    pub is_active_tab: bool,
    pub is_hidden: bool,
    pub video_details: Option<VideoDetails>,
    /// Milliseconds since the Unix epoch of the last transition into `unsuspended`.
    pub unsuspended_timestamp: Option<u64>,
    pub remaining_time_may_be_stale: bool,
}

impl TabRecord {
    pub fn new(id: TabId, window_id: Option<WindowId>) -> Self {
        Self {
            id,
            window_id,
            url: String::new(),
            index: None,
            pinned: false,
            status: None,
            content_script_ready: false,
            metadata_loaded: false,
            is_live_stream: false,
            is_active_tab: false,
            is_hidden: false,
            video_details: None,
            unsuspended_timestamp: None,
            remaining_time_may_be_stale: false,
        }
    }

    /// Stored remaining time, regardless of staleness.
    pub fn remaining_time(&self) -> Option<f64> {
        self.video_details.as_ref().and_then(|d| d.remaining_time)
    }

    /// Remaining time that ordering decisions may rely on.
    pub fn fresh_remaining_time(&self) -> Option<f64> {
        if self.remaining_time_may_be_stale {
            return None;
        }
        self.remaining_time().filter(|t| t.is_finite())
    }

    pub fn has_fresh_remaining_time(&self) -> bool {
        self.fresh_remaining_time().is_some()
    }

    /// Eligible for time-based ordering: not pinned and not a live stream.
    pub fn is_sortable(&self) -> bool {
        !self.pinned && !self.is_live_stream
    }

    pub fn is_unsuspended(&self) -> bool {
        self.status == Some(TabStatus::Unsuspended)
    }

    pub fn video_details_mut(&mut self) -> &mut VideoDetails {
        self.video_details.get_or_insert_with(VideoDetails::default)
    }

    pub fn clear_remaining_time(&mut self) {
        if let Some(details) = self.video_details.as_mut() {
            details.remaining_time = None;
        }
    }
}
