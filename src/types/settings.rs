use serde::{Deserialize, Serialize};

/// Smallest refresh period the browser's alarm API honours.
pub const MIN_REFRESH_INTERVAL_MINUTES: u64 = 1;

/// Longest refresh period; larger configured values are capped to one day.
pub const MAX_REFRESH_INTERVAL_MINUTES: u64 = 24 * 60;

/// Top-level host settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HostSettings {
    #[serde(default)]
    pub sort: SortSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub bridge: BridgeSettings,
}

/// Options read before every sort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SortSettings {
    /// Cluster tabs from other sites by hostname instead of keeping their order.
    #[serde(default)]
    pub group_non_matching_tabs_by_domain: bool,
}

/// Periodic metrics refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshSettings {
    pub interval_minutes: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_minutes: MIN_REFRESH_INTERVAL_MINUTES,
        }
    }
}

impl RefreshSettings {
    pub fn period(&self) -> std::time::Duration {
        let minutes = self
            .interval_minutes
            .clamp(MIN_REFRESH_INTERVAL_MINUTES, MAX_REFRESH_INTERVAL_MINUTES);
        std::time::Duration::from_secs(minutes * 60)
    }
}

/// Stdio bridge to the extension shim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeSettings {
    pub call_timeout_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            call_timeout_ms: 5000,
        }
    }
}
