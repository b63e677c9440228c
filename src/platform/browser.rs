//! The async boundary between the service and the browser.
//!
//! Every call here is a suspension point: callers must not hold the state
//! lock across one and must re-read records by id afterwards.

use async_trait::async_trait;

use crate::types::errors::BrowserError;
use crate::types::messages::{OutboundEvent, VideoMetrics};
use crate::types::tab::{BrowserTab, TabId, TabQuery};

/// Browser operations the service depends on.
#[async_trait]
pub trait BrowserApi: Send + Sync {
    /// `tabs.query` for one window.
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<BrowserTab>, BrowserError>;
    async fn get_tab(&self, tab_id: TabId) -> Result<BrowserTab, BrowserError>;
    async fn move_tab(&self, tab_id: TabId, index: usize) -> Result<(), BrowserError>;
    async fn activate_tab(&self, tab_id: TabId) -> Result<(), BrowserError>;
    async fn reload_tab(&self, tab_id: TabId) -> Result<(), BrowserError>;
    /// Sends `getVideoMetrics` to the tab's in-page agent.
    async fn request_video_metrics(&self, tab_id: TabId) -> Result<VideoMetrics, BrowserError>;
    /// Pushes an event to any listening UI.
    async fn broadcast(&self, event: &OutboundEvent) -> Result<(), BrowserError>;
}
