//! Refreshes one tab's playback metrics from its in-page agent.
//!
//! Safe to retry: failures are swallowed and the next poll tick tries again.

use futures::future::join_all;
use tracing::debug;

use crate::managers::background_state::SharedState;
use crate::managers::window_tracker::WindowTrackerTrait;
use crate::platform::browser::BrowserApi;
use crate::services::snapshot_broadcaster::recompute_and_broadcast;
use crate::services::url_patterns::is_watch_url;
use crate::types::errors::BrowserError;
use crate::types::messages::VideoMetrics;
use crate::types::record::TabRecord;
use crate::types::tab::TabId;

/// How a poll response was folded into the record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// No usable reply; the agent is treated as not ready.
    AgentUnavailable,
    LiveStream,
    /// Reply without a finite content length.
    LengthUnknown,
    /// Length and position known.
    Measured(f64),
    /// Length known, position not; remaining time is the full length and stale.
    Estimated(f64),
}

/// Folds an agent reply (or its absence) into `record`.
pub fn apply_metrics_response(
    record: &mut TabRecord,
    response: Result<VideoMetrics, BrowserError>,
) -> PollOutcome {
    let metrics = match response {
        Ok(metrics) => metrics,
        Err(_) => {
            record.content_script_ready = false;
            record.clear_remaining_time();
            record.remaining_time_may_be_stale = false;
            return PollOutcome::AgentUnavailable;
        }
    };

    record.content_script_ready = true;
    if let Some(title) = metrics.title.as_deref().filter(|t| !t.is_empty()) {
        record.video_details_mut().title = Some(title.to_string());
    }
    if record.url.is_empty() {
        if let Some(url) = metrics.url.as_deref() {
            record.url = url.to_string();
        }
    }

    let length = metrics.content_length();
    if metrics.is_live {
        record.is_live_stream = true;
        let details = record.video_details_mut();
        details.length_seconds = length;
        details.remaining_time = None;
        record.remaining_time_may_be_stale = false;
        return PollOutcome::LiveStream;
    }
    record.is_live_stream = false;

    let position = metrics.current_time.filter(|t| t.is_finite());
    let rate = metrics.effective_rate();
    let details = record.video_details_mut();
    let outcome = match (length, position) {
        (None, _) => {
            details.length_seconds = None;
            details.remaining_time = None;
            record.remaining_time_may_be_stale = false;
            return PollOutcome::LengthUnknown;
        }
        (Some(len), Some(pos)) => {
            let remaining = ((len - pos) / rate).max(0.0);
            details.length_seconds = Some(len);
            details.remaining_time = Some(remaining);
            PollOutcome::Measured(remaining)
        }
        (Some(len), None) => {
            let remaining = len.max(0.0);
            details.length_seconds = Some(len);
            details.remaining_time = Some(remaining);
            PollOutcome::Estimated(remaining)
        }
    };
    record.remaining_time_may_be_stale = matches!(outcome, PollOutcome::Estimated(_));
    outcome
}

/// Polls one tab and recomputes ordering.
///
/// Returns `None` when the poll was skipped: no record, not unsuspended,
/// tab gone, tab in another window, or no longer a watch page. A reply that
/// arrives after the record left `unsuspended` or changed URL is dropped.
pub async fn refresh_metrics_for_tab(
    state: &SharedState,
    browser: &dyn BrowserApi,
    tab_id: TabId,
) -> Option<PollOutcome> {
    {
        let guard = state.lock();
        if !guard.records.get(tab_id).is_some_and(|r| r.is_unsuspended()) {
            return None;
        }
    }

    let tab = match browser.get_tab(tab_id).await {
        Ok(tab) => tab,
        Err(e) => {
            debug!("poll skipped, tab {} unavailable: {}", tab_id, e);
            return None;
        }
    };

    let polled_url = {
        let mut guard = state.lock();
        if !guard.window.accepts(Some(tab.window_id)) {
            return None;
        }
        guard.window.resolve(Some(tab.window_id), false);
        let record = guard.records.get_mut(tab_id)?;
        record.window_id = Some(tab.window_id);
        record.is_active_tab = tab.active;
        record.is_hidden = tab.hidden;
        if !is_watch_url(&tab.url) {
            return None;
        }
        record.url.clone()
    };

    let response = browser.request_video_metrics(tab_id).await;
    if let Err(e) = &response {
        debug!("skipped metrics for tab {}: {}", tab_id, e);
    }

    let outcome = {
        let mut guard = state.lock();
        let record = guard.records.get_mut(tab_id)?;
        // Status or URL may have changed while the reply was pending.
        if !record.is_unsuspended() || record.url != polled_url {
            debug!("dropped metrics for tab {}: record changed during poll", tab_id);
            return None;
        }
        apply_metrics_response(record, response)
    };
    debug!("tab {} metrics: {:?}", tab_id, outcome);

    recompute_and_broadcast(state, browser).await;
    Some(outcome)
}

/// Polls every tracked record concurrently.
pub async fn refresh_all_metrics(state: &SharedState, browser: &dyn BrowserApi) {
    let ids = state.lock().records.ids();
    join_all(ids.into_iter().map(|id| refresh_metrics_for_tab(state, browser, id))).await;
}
