// Wire messages exchanged with the UI, the in-page agents and the extension shim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ordering::ReadinessMetrics;
use super::record::TabRecord;
use super::tab::{BrowserTab, TabId, WindowId};

/// Who sent an inbound command. Content agents carry their tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MessageSender {
    #[serde(default)]
    pub tab: Option<BrowserTab>,
}

impl MessageSender {
    pub fn from_tab(tab: BrowserTab) -> Self {
        Self { tab: Some(tab) }
    }

    pub fn tab_id(&self) -> Option<TabId> {
        self.tab.as_ref().map(|t| t.id)
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.tab.as_ref().map(|t| t.window_id)
    }
}

/// Details an in-page agent pushes before the first authoritative poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LightweightDetails {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub length_seconds: Option<f64>,
    #[serde(default)]
    pub is_live: Option<bool>,
}

/// Inbound commands, tagged by the `message` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "message", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    UpdateRecords {
        window_id: Option<WindowId>,
    },
    SendRecords {
        window_id: Option<WindowId>,
    },
    AreTabsKnownSorted {
        window_id: Option<WindowId>,
    },
    SortTabs {
        window_id: Option<WindowId>,
    },
    ActivateTab {
        tab_id: TabId,
        window_id: Option<WindowId>,
    },
    ReloadTab {
        tab_id: TabId,
        window_id: Option<WindowId>,
    },
    ContentScriptReady,
    MetadataLoaded,
    LightweightDetails {
        #[serde(default)]
        details: LightweightDetails,
    },
    /// Diagnostic line forwarded from the popup.
    LogPopupMessage {
        #[serde(default)]
        level: Option<String>,
        #[serde(default)]
        info: String,
    },
    Ping,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpdateRecords { .. } => "updateRecords",
            Command::SendRecords { .. } => "sendRecords",
            Command::AreTabsKnownSorted { .. } => "areTabsKnownSorted",
            Command::SortTabs { .. } => "sortTabs",
            Command::ActivateTab { .. } => "activateTab",
            Command::ReloadTab { .. } => "reloadTab",
            Command::ContentScriptReady => "contentScriptReady",
            Command::MetadataLoaded => "metadataLoaded",
            Command::LightweightDetails { .. } => "lightweightDetails",
            Command::LogPopupMessage { .. } => "logPopupMessage",
            Command::Ping => "ping",
        }
    }
}

/// Reply to `getVideoMetrics` from an in-page agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetrics {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub length_seconds: Option<f64>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub current_time: Option<f64>,
    #[serde(default)]
    pub playback_rate: Option<f64>,
    #[serde(default)]
    pub paused: bool,
}

impl VideoMetrics {
    /// Content length, preferring the page metadata over the media element.
    pub fn content_length(&self) -> Option<f64> {
        self.length_seconds
            .or(self.duration)
            .filter(|len| len.is_finite())
    }

    /// Playback rate usable as a divisor.
    pub fn effective_rate(&self) -> f64 {
        match self.playback_rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => rate,
            _ => 1.0,
        }
    }
}

/// What the status UI should suggest the user do with a tab.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UserAction {
    ViewTabToRefreshTime,
    ReloadTab,
    InteractWithTab,
    InteractWithTabThenReload,
    FacilitateLoad,
    None,
}

/// Read-only copy of the record store and ordering state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    pub records: BTreeMap<TabId, TabRecord>,
    pub target_order: Vec<TabId>,
    pub current_order: Vec<TabId>,
    pub is_fully_sorted: bool,
    pub readiness_metrics: ReadinessMetrics,
    pub suggested_actions: BTreeMap<TabId, UserAction>,
}

/// Events pushed to whichever UI is listening.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "message", content = "payload", rename_all = "camelCase")]
pub enum OutboundEvent {
    TabRecordsUpdated(TabSnapshot),
}
