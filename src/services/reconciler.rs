//! Brings the record store in line with the live tabs of the tracked window.

use futures::future::join;
use tracing::debug;

use crate::managers::background_state::{now_millis, SharedState};
use crate::managers::record_store::dedupe_tabs;
use crate::managers::window_tracker::WindowTrackerTrait;
use crate::platform::browser::BrowserApi;
use crate::services::snapshot_broadcaster::recompute_and_broadcast;
use crate::types::tab::{BrowserTab, TabQuery, WindowId, WindowSelector};

/// What a reconcile pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The store now mirrors the fetched tab list.
    Applied,
    /// A later reconcile started while this one was fetching.
    Superseded,
    /// Nothing came back and there is no window to track.
    NoTarget,
    /// Every tab query failed; previous state kept.
    FetchFailed,
}

/// Visible and hidden tabs of one window, deduplicated by id.
///
/// Returns `None` only when both queries fail.
pub async fn fetch_window_tabs(
    browser: &dyn BrowserApi,
    window_id: Option<WindowId>,
) -> Option<Vec<BrowserTab>> {
    let selector = match window_id {
        Some(id) => WindowSelector::Id(id),
        None => WindowSelector::Current,
    };
    let visible_query = TabQuery::for_window(selector);
    let hidden_query = TabQuery::hidden_in(selector);

    let (visible, hidden) = join(
        browser.query_tabs(&visible_query),
        browser.query_tabs(&hidden_query),
    )
    .await;

    let mut batches = Vec::new();
    let mut failures = 0;
    for result in [visible, hidden] {
        match result {
            Ok(tabs) => batches.push(tabs),
            Err(e) => {
                debug!("tab query failed: {}", e);
                failures += 1;
            }
        }
    }
    if failures == 2 {
        return None;
    }
    Some(dedupe_tabs(batches))
}

/// Fetches the window's tabs and folds them into the store.
///
/// `window_id` is a candidate for the tracker; without `force` it only takes
/// effect when nothing is tracked yet. With no candidate the tracked window
/// is used, falling back to the browser's current window.
pub async fn reconcile(
    state: &SharedState,
    browser: &dyn BrowserApi,
    window_id: Option<WindowId>,
    force: bool,
) -> ReconcileOutcome {
    let (ticket, target) = {
        let mut guard = state.lock();
        let target = match window_id {
            Some(_) => guard.window.resolve(window_id, force),
            None => guard.window.tracked_window_id(),
        };
        (guard.records.begin_reconcile(), target)
    };

    let tabs = match fetch_window_tabs(browser, target).await {
        Some(tabs) => tabs,
        None => return ReconcileOutcome::FetchFailed,
    };

    {
        let mut guard = state.lock();
        if !guard.records.is_current(ticket) {
            debug!("reconcile for window {:?} superseded", target);
            return ReconcileOutcome::Superseded;
        }
        if target.is_none() {
            match tabs.first() {
                Some(first) => {
                    guard.window.resolve(Some(first.window_id), false);
                }
                None => return ReconcileOutcome::NoTarget,
            }
        }
        guard.records.apply_reconcile(ticket, &tabs, now_millis());
    }

    recompute_and_broadcast(state, browser).await;
    ReconcileOutcome::Applied
}
