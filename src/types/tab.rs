use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Browser-assigned tab identifier.
pub type TabId = i64;

/// Browser-assigned window identifier.
pub type WindowId = i64;

/// The browser's sentinel for "no window" (e.g. focus left the browser).
pub const WINDOW_ID_NONE: WindowId = -1;

/// Returns true for ids the browser can actually hand out for a window.
pub fn is_valid_window_id(window_id: WindowId) -> bool {
    window_id >= 0
}

/// A live tab as reported by the browser's tab API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BrowserTab {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub url: String,
    /// Position inside the window. Absent while the browser is mid-move.
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub discarded: bool,
    /// Raw load status: "loading" or "complete".
    #[serde(default)]
    pub status: Option<String>,
}

impl BrowserTab {
    pub fn is_loading(&self) -> bool {
        self.status.as_deref() == Some("loading")
    }
}

/// Which window a tab query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSelector {
    Id(WindowId),
    Current,
}

/// Query passed to `BrowserApi::query_tabs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabQuery {
    pub window: WindowSelector,
    /// `Some(true)` asks for hidden tabs only; `None` uses the browser default.
    pub hidden: Option<bool>,
}

impl TabQuery {
    pub fn for_window(window: WindowSelector) -> Self {
        Self { window, hidden: None }
    }

    pub fn hidden_in(window: WindowSelector) -> Self {
        Self {
            window,
            hidden: Some(true),
        }
    }

    /// Wire form understood by the extension shim's `tabs.query`.
    pub fn to_params(&self) -> Value {
        let mut params = match self.window {
            WindowSelector::Id(id) => json!({ "windowId": id }),
            WindowSelector::Current => json!({ "currentWindow": true }),
        };
        if let (Some(hidden), Some(map)) = (self.hidden, params.as_object_mut()) {
            map.insert("hidden".to_string(), Value::Bool(hidden));
        }
        params
    }
}
