//! Reactions to browser-side notifications.
//!
//! Each handler gates on the tracked window first, then reconciles and/or
//! polls. Failures are swallowed; the next event or refresh tick retries.

use tracing::debug;

use crate::app::App;
use crate::managers::window_tracker::WindowTrackerTrait;
use crate::services::url_patterns::is_watch_url;
use crate::types::events::{BrowserEvent, NavigationDetails, RemoveInfo, TabChangeInfo};
use crate::types::tab::{is_valid_window_id, BrowserTab, TabId, WindowId};

pub async fn handle_browser_event(app: &App, event: BrowserEvent) {
    match event {
        BrowserEvent::TabUpdated {
            tab_id,
            change_info,
            tab,
        } => on_tab_updated(app, tab_id, &change_info, tab.as_ref()).await,
        BrowserEvent::TabRemoved { tab_id, remove_info } => {
            on_tab_removed(app, tab_id, &remove_info).await
        }
        BrowserEvent::TabMoved { window_id, .. } => reconcile_if_accepted(app, window_id).await,
        BrowserEvent::TabAttached { new_window_id, .. } => {
            reconcile_if_accepted(app, new_window_id).await
        }
        BrowserEvent::TabDetached { old_window_id, .. } => {
            reconcile_if_accepted(app, old_window_id).await
        }
        BrowserEvent::TabReplaced {
            added_tab_id,
            removed_tab_id,
        } => on_tab_replaced(app, added_tab_id, removed_tab_id).await,
        BrowserEvent::WindowFocusChanged { window_id } => {
            on_window_focus_changed(app, window_id).await
        }
        BrowserEvent::WindowRemoved { window_id } => on_window_removed(app, window_id).await,
        BrowserEvent::HistoryStateUpdated { details } => {
            on_history_state_updated(app, &details).await
        }
        BrowserEvent::RefreshTick => app.on_refresh_tick().await,
    }
}

fn accepts(app: &App, window_id: WindowId) -> bool {
    app.state.lock().window.accepts(Some(window_id))
}

async fn reconcile_if_accepted(app: &App, window_id: WindowId) {
    if accepts(app, window_id) {
        app.reconcile(Some(window_id), false).await;
    }
}

pub async fn on_tab_updated(
    app: &App,
    tab_id: TabId,
    change: &TabChangeInfo,
    tab: Option<&BrowserTab>,
) {
    let Some(tab) = tab else {
        return;
    };
    if !accepts(app, tab.window_id) || !change.is_relevant() {
        return;
    }
    app.reconcile(Some(tab.window_id), false).await;
    if is_watch_url(&tab.url) {
        app.refresh_metrics_for_tab(tab_id).await;
    }
}

pub async fn on_tab_removed(app: &App, tab_id: TabId, info: &RemoveInfo) {
    let closing_tracked = {
        let mut guard = app.state.lock();
        if !guard.window.accepts(info.window_id) {
            return;
        }
        guard.records.remove(tab_id);
        info.is_window_closing
            && info
                .window_id
                .is_some_and(|id| guard.window.is_tracked(id))
    };

    if closing_tracked {
        app.reset_tracked_window().await;
    } else {
        app.recompute_and_broadcast().await;
    }
}

pub async fn on_tab_replaced(app: &App, added_tab_id: TabId, removed_tab_id: TabId) {
    debug!("tab {} replaced by {}", removed_tab_id, added_tab_id);
    app.state.lock().records.remove(removed_tab_id);
    app.reconcile(None, false).await;
}

/// A real window id force-retargets tracking; focus leaving the browser is ignored.
pub async fn on_window_focus_changed(app: &App, window_id: WindowId) {
    if !is_valid_window_id(window_id) {
        return;
    }
    app.reconcile(Some(window_id), true).await;
}

pub async fn on_window_removed(app: &App, window_id: WindowId) {
    let tracked = app.state.lock().window.is_tracked(window_id);
    if tracked {
        app.reset_tracked_window().await;
    }
}

/// In-page navigation on the video site. Top frame and watch pages only.
pub async fn on_history_state_updated(app: &App, details: &NavigationDetails) {
    if details.frame_id != 0 || !is_watch_url(&details.url) {
        return;
    }

    let tracked = app.state.lock().window.tracked_window_id();
    let window_id = match details.tab_id {
        Some(tab_id) => match app.browser.get_tab(tab_id).await {
            Ok(tab) if accepts(app, tab.window_id) => Some(tab.window_id),
            Ok(_) => return,
            Err(e) => {
                debug!("navigation in tab {} ignored: {}", tab_id, e);
                return;
            }
        },
        None => tracked,
    };

    app.reconcile(window_id, false).await;
    if let Some(tab_id) = details.tab_id {
        app.refresh_metrics_for_tab(tab_id).await;
    }
}
