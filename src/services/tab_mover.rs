//! Applies the target order to the real tabs of the tracked window.
//!
//! Final layout: pinned tabs untouched, then watch/shorts tabs in target
//! order, then tabs from other sites.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::managers::background_state::SharedState;
use crate::managers::window_tracker::WindowTrackerTrait;
use crate::platform::browser::BrowserApi;
use crate::services::reconciler::{fetch_window_tabs, reconcile};
use crate::services::url_patterns::{hostname_key, is_matching_domain, is_watch_url};
use crate::types::settings::SortSettings;
use crate::types::tab::{BrowserTab, TabId, WindowId};

/// Fewer fresh remaining times than this is not worth moving tabs for.
pub const MIN_KNOWN_TABS_TO_SORT: usize = 2;

/// Tabs moved and tabs whose move failed, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub moved: Vec<TabId>,
    pub failed: Vec<TabId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    NotEnoughKnownTabs,
    FetchFailed,
    Completed(MoveReport),
}

/// Watch/shorts sub-order: known-ordered ids still in the window, then any
/// remaining watch tabs, then other pages on the same site.
pub fn build_watch_tab_order(unpinned: &[BrowserTab], ordered_ids: &[TabId]) -> Vec<TabId> {
    let watch_ids: HashSet<TabId> = unpinned
        .iter()
        .filter(|t| is_watch_url(&t.url))
        .map(|t| t.id)
        .collect();

    let mut order: Vec<TabId> = Vec::new();
    let mut placed = HashSet::new();
    for id in ordered_ids {
        if watch_ids.contains(id) && placed.insert(*id) {
            order.push(*id);
        }
    }
    for tab in unpinned.iter().filter(|t| is_watch_url(&t.url)) {
        if placed.insert(tab.id) {
            order.push(tab.id);
        }
    }
    for tab in unpinned
        .iter()
        .filter(|t| is_matching_domain(&t.url) && !is_watch_url(&t.url))
    {
        if placed.insert(tab.id) {
            order.push(tab.id);
        }
    }
    order
}

/// Tabs from other sites, either as they are or clustered by hostname in
/// first-seen order.
pub fn build_non_matching_order(unpinned: &[BrowserTab], group_by_domain: bool) -> Vec<TabId> {
    let others = unpinned.iter().filter(|t| !is_matching_domain(&t.url));
    if !group_by_domain {
        return others.map(|t| t.id).collect();
    }

    let mut hosts: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<TabId>> = HashMap::new();
    for tab in others {
        let host = hostname_key(&tab.url);
        groups
            .entry(host.clone())
            .or_insert_with(|| {
                hosts.push(host);
                Vec::new()
            })
            .push(tab.id);
    }
    hosts
        .into_iter()
        .flat_map(|host| groups.remove(&host).unwrap_or_default())
        .collect()
}

/// Issues one move per tab, starting at `start_index`.
///
/// A failed move is logged and skipped; it does not take up a slot.
pub async fn move_tabs_sequentially(
    browser: &dyn BrowserApi,
    order: &[TabId],
    start_index: usize,
) -> MoveReport {
    let mut report = MoveReport::default();
    let mut index = start_index;
    for &tab_id in order {
        match browser.move_tab(tab_id, index).await {
            Ok(()) => {
                report.moved.push(tab_id);
                index += 1;
            }
            Err(e) => {
                debug!("failed to move tab {} to {}: {}", tab_id, index, e);
                report.failed.push(tab_id);
            }
        }
    }
    report
}

/// Reorders the tracked window by remaining time, then reconciles.
pub async fn sort_tabs_in_current_window(
    state: &SharedState,
    browser: &dyn BrowserApi,
    window_id: Option<WindowId>,
    options: &SortSettings,
) -> SortOutcome {
    let (target, ordered_ids) = {
        let mut guard = state.lock();
        let target = match window_id {
            Some(_) => guard.window.resolve(window_id, false),
            None => guard.window.tracked_window_id(),
        };
        let known = guard
            .records
            .records()
            .filter(|r| r.is_sortable() && r.has_fresh_remaining_time())
            .count();
        if known < MIN_KNOWN_TABS_TO_SORT {
            debug!("sort skipped: only {} tabs with known remaining time", known);
            return SortOutcome::NotEnoughKnownTabs;
        }
        (target, guard.ordering.target_order.clone())
    };

    let mut tabs = match fetch_window_tabs(browser, target).await {
        Some(tabs) => tabs,
        None => return SortOutcome::FetchFailed,
    };
    tabs.sort_by_key(|t| (t.index.unwrap_or(i64::MAX), t.id));

    let pinned_count = tabs.iter().filter(|t| t.pinned).count();
    let unpinned: Vec<BrowserTab> = tabs.into_iter().filter(|t| !t.pinned).collect();

    let mut order = build_watch_tab_order(&unpinned, &ordered_ids);
    order.extend(build_non_matching_order(
        &unpinned,
        options.group_non_matching_tabs_by_domain,
    ));

    let report = move_tabs_sequentially(browser, &order, pinned_count).await;
    info!(
        "sorted window {:?}: {} moved, {} failed",
        target,
        report.moved.len(),
        report.failed.len()
    );

    reconcile(state, browser, target, false).await;
    SortOutcome::Completed(report)
}
