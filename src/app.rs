//! App Core for TabSort.
//!
//! Central struct holding the shared background state, the browser bridge and
//! the settings engine. Cheap to clone; every clone drives the same state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::managers::background_state::{now_millis, BackgroundState, SharedState};
use crate::managers::window_tracker::WindowTrackerTrait;
use crate::platform::browser::BrowserApi;
use crate::services::metrics_poller::{self, PollOutcome};
use crate::services::reconciler::{self, ReconcileOutcome};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::snapshot_broadcaster::{self, build_snapshot, BroadcastOutcome};
use crate::services::tab_mover::{self, SortOutcome};
use crate::types::messages::{LightweightDetails, MessageSender, TabSnapshot};
use crate::types::record::TabStatus;
use crate::types::settings::{MAX_REFRESH_INTERVAL_MINUTES, MIN_REFRESH_INTERVAL_MINUTES};
use crate::types::tab::{is_valid_window_id, TabId, WindowId};

/// Central application struct.
#[derive(Clone)]
pub struct App {
    pub state: SharedState,
    pub browser: Arc<dyn BrowserApi>,
    pub settings: Arc<Mutex<SettingsEngine>>,
}

impl App {
    pub fn new(browser: Arc<dyn BrowserApi>, settings: SettingsEngine) -> Self {
        Self {
            state: SharedState::new(BackgroundState::new()),
            browser,
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    fn browser(&self) -> &dyn BrowserApi {
        self.browser.as_ref()
    }

    // ─── Records ───

    pub async fn reconcile(&self, window_id: Option<WindowId>, force: bool) -> ReconcileOutcome {
        reconciler::reconcile(&self.state, self.browser(), window_id, force).await
    }

    /// Reconcile on behalf of the UI: a valid window id retargets tracking.
    pub async fn reconcile_for_ui(&self, window_id: Option<WindowId>) -> ReconcileOutcome {
        let force = window_id.is_some_and(is_valid_window_id);
        self.reconcile(window_id, force).await
    }

    pub async fn refresh_metrics_for_tab(&self, tab_id: TabId) -> Option<PollOutcome> {
        metrics_poller::refresh_metrics_for_tab(&self.state, self.browser(), tab_id).await
    }

    pub async fn refresh_all_metrics(&self) {
        metrics_poller::refresh_all_metrics(&self.state, self.browser()).await
    }

    pub fn snapshot(&self) -> TabSnapshot {
        build_snapshot(&self.state.lock(), now_millis())
    }

    /// Reconciles, polls every tracked tab, then returns the snapshot.
    pub async fn send_records(&self, window_id: Option<WindowId>) -> TabSnapshot {
        self.reconcile_for_ui(window_id).await;
        self.refresh_all_metrics().await;
        self.snapshot()
    }

    pub async fn are_tabs_known_sorted(&self, window_id: Option<WindowId>) -> bool {
        self.reconcile_for_ui(window_id).await;
        self.state.lock().ordering.is_fully_sorted
    }

    pub async fn broadcast(&self, force: bool) -> BroadcastOutcome {
        snapshot_broadcaster::broadcast_snapshot(&self.state, self.browser(), force).await
    }

    pub async fn recompute_and_broadcast(&self) -> BroadcastOutcome {
        snapshot_broadcaster::recompute_and_broadcast(&self.state, self.browser()).await
    }

    /// Forgets the tracked window and every record.
    pub async fn reset_tracked_window(&self) {
        self.state.lock().reset();
        info!("tracked window reset");
        self.recompute_and_broadcast().await;
    }

    // ─── Tab actions ───

    /// Sorts the tracked window. Options are re-read from disk first.
    pub async fn sort_tabs(&self, window_id: Option<WindowId>) -> SortOutcome {
        if let Some(id) = window_id.filter(|id| is_valid_window_id(*id)) {
            self.state.lock().window.resolve(Some(id), true);
        }
        let options = match self.settings.lock() {
            Ok(mut engine) => engine.load_sort_options(),
            Err(poisoned) => poisoned.into_inner().load_sort_options(),
        };
        tab_mover::sort_tabs_in_current_window(&self.state, self.browser(), None, &options).await
    }

    fn retarget(&self, window_id: Option<WindowId>) {
        if let Some(id) = window_id.filter(|id| is_valid_window_id(*id)) {
            self.state.lock().window.resolve(Some(id), true);
        }
    }

    /// Best-effort activation.
    pub async fn activate_tab(&self, tab_id: TabId, window_id: Option<WindowId>) -> bool {
        self.retarget(window_id);
        match self.browser().activate_tab(tab_id).await {
            Ok(()) => true,
            Err(e) => {
                debug!("activate tab {} failed: {}", tab_id, e);
                false
            }
        }
    }

    /// Best-effort reload. On success the record goes back to `loading`.
    pub async fn reload_tab(&self, tab_id: TabId, window_id: Option<WindowId>) -> bool {
        self.retarget(window_id);
        if let Err(e) = self.browser().reload_tab(tab_id).await {
            debug!("reload tab {} failed: {}", tab_id, e);
            return false;
        }

        let touched = {
            let mut guard = self.state.lock();
            match guard.records.get_mut(tab_id) {
                Some(record) => {
                    record.status = Some(TabStatus::Loading);
                    record.unsuspended_timestamp = Some(now_millis());
                    record.content_script_ready = false;
                    record.metadata_loaded = false;
                    record.remaining_time_may_be_stale = true;
                    record.clear_remaining_time();
                    true
                }
                None => false,
            }
        };
        if touched {
            self.recompute_and_broadcast().await;
        }
        true
    }

    // ─── Content agents ───

    /// Admits the sender's window and adopts it when nothing is tracked.
    /// Returns the sender's tab id when the message should be processed.
    fn admit_sender(&self, sender: &MessageSender) -> Option<TabId> {
        let mut guard = self.state.lock();
        let window_id = sender.window_id();
        if !guard.window.accepts(window_id) {
            return None;
        }
        guard.window.resolve(window_id, false);
        sender.tab_id()
    }

    /// Returns true when the sender was admitted.
    pub async fn on_content_script_ready(&self, sender: &MessageSender) -> bool {
        let Some(tab_id) = self.admit_sender(sender) else {
            return false;
        };
        {
            let mut guard = self.state.lock();
            let default_url = sender.tab.as_ref().map(|t| t.url.as_str());
            let record = guard
                .records
                .ensure_record(tab_id, sender.window_id(), default_url);
            record.content_script_ready = true;
        }
        self.recompute_and_broadcast().await;
        self.refresh_metrics_for_tab(tab_id).await;
        true
    }

    pub async fn on_metadata_loaded(&self, sender: &MessageSender) {
        let Some(tab_id) = self.admit_sender(sender) else {
            return;
        };
        if let Some(record) = self.state.lock().records.get_mut(tab_id) {
            record.metadata_loaded = true;
        }
        self.broadcast(false).await;
        self.refresh_metrics_for_tab(tab_id).await;
    }

    /// Seeds video details pushed by an agent ahead of the first poll.
    pub async fn on_lightweight_details(&self, details: &LightweightDetails, sender: &MessageSender) {
        let Some(tab_id) = self.admit_sender(sender) else {
            return;
        };
        {
            let mut guard = self.state.lock();
            let default_url = details
                .url
                .as_deref()
                .filter(|u| !u.is_empty())
                .or_else(|| sender.tab.as_ref().map(|t| t.url.as_str()));
            let record = guard
                .records
                .ensure_record(tab_id, sender.window_id(), default_url);
            if let Some(url) = details.url.as_deref().filter(|u| !u.is_empty()) {
                record.url = url.to_string();
            }
            if let Some(is_live) = details.is_live {
                record.is_live_stream = is_live;
            }
            let is_live = record.is_live_stream;
            let seeded_stale = {
                let video = record.video_details_mut();
                if let Some(title) = details.title.as_deref().filter(|t| !t.is_empty()) {
                    video.title = Some(title.to_string());
                }
                match details.length_seconds.filter(|l| l.is_finite()) {
                    Some(length) => {
                        video.length_seconds = Some(length);
                        if !is_live && video.remaining_time.is_none() {
                            video.remaining_time = Some(length);
                            true
                        } else {
                            false
                        }
                    }
                    None => false,
                }
            };
            if seeded_stale {
                record.remaining_time_may_be_stale = true;
            }
            if is_live {
                record.clear_remaining_time();
                record.remaining_time_may_be_stale = false;
            }
        }
        self.recompute_and_broadcast().await;
    }

    // ─── Periodic refresh ───

    /// Polls every tracked tab, then forces a reconcile of the tracked window.
    pub async fn on_refresh_tick(&self) {
        self.refresh_all_metrics().await;
        let tracked = self.state.lock().window.tracked_window_id();
        self.reconcile(tracked, true).await;
    }

    /// Runs `on_refresh_tick` forever at `period`, never faster than once a minute.
    pub async fn run_refresh_loop(&self, period: Duration) {
        let floor = Duration::from_secs(MIN_REFRESH_INTERVAL_MINUTES * 60);
        let ceiling = Duration::from_secs(MAX_REFRESH_INTERVAL_MINUTES * 60);
        let mut ticker = interval(period.clamp(floor, ceiling));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            debug!("refresh tick");
            self.on_refresh_tick().await;
        }
    }
}
