// Browser events forwarded by the extension shim.

use serde::{Deserialize, Serialize};

use super::tab::{BrowserTab, TabId, WindowId};

/// Subset of `tabs.onUpdated` change info the service reacts to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TabChangeInfo {
    #[serde(default)]
    pub discarded: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TabChangeInfo {
    /// Only discard, load-state and URL changes can affect a record.
    pub fn is_relevant(&self) -> bool {
        self.discarded.is_some()
            || matches!(self.status.as_deref(), Some("loading") | Some("complete"))
            || self.url.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoveInfo {
    #[serde(default)]
    pub window_id: Option<WindowId>,
    #[serde(default)]
    pub is_window_closing: bool,
}

/// In-page navigation (history.pushState) reported by the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDetails {
    #[serde(default)]
    pub tab_id: Option<TabId>,
    #[serde(default)]
    pub frame_id: i64,
    #[serde(default)]
    pub url: String,
}

/// Browser-side notifications, tagged by the `event` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BrowserEvent {
    TabUpdated {
        tab_id: TabId,
        #[serde(default)]
        change_info: TabChangeInfo,
        tab: Option<BrowserTab>,
    },
    TabRemoved {
        tab_id: TabId,
        #[serde(default)]
        remove_info: RemoveInfo,
    },
    TabMoved {
        tab_id: TabId,
        window_id: WindowId,
    },
    TabAttached {
        tab_id: TabId,
        new_window_id: WindowId,
    },
    TabDetached {
        tab_id: TabId,
        old_window_id: WindowId,
    },
    TabReplaced {
        added_tab_id: TabId,
        removed_tab_id: TabId,
    },
    WindowFocusChanged {
        window_id: WindowId,
    },
    WindowRemoved {
        window_id: WindowId,
    },
    HistoryStateUpdated {
        #[serde(flatten)]
        details: NavigationDetails,
    },
    RefreshTick,
}
