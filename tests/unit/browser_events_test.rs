//! Browser event handling: window gating, removal, retargeting and refresh ticks.

#[path = "../common/fake_browser.rs"]
mod fake_browser;

use serde_json::json;

use fake_browser::*;
use tabsort::event_handler::handle_browser_event;
use tabsort::managers::window_tracker::WindowTrackerTrait;
use tabsort::types::events::{BrowserEvent, NavigationDetails, RemoveInfo, TabChangeInfo};
use tabsort::types::tab::WINDOW_ID_NONE;

fn completed() -> TabChangeInfo {
    TabChangeInfo {
        status: Some("complete".to_string()),
        ..Default::default()
    }
}

#[test]
fn events_parse_from_wire_form() {
    let event: BrowserEvent = serde_json::from_value(json!({
        "event": "tabRemoved",
        "tabId": 4,
        "removeInfo": {"windowId": 1, "isWindowClosing": true}
    }))
    .unwrap();
    assert_eq!(
        event,
        BrowserEvent::TabRemoved {
            tab_id: 4,
            remove_info: RemoveInfo {
                window_id: Some(1),
                is_window_closing: true
            }
        }
    );

    let event: BrowserEvent = serde_json::from_value(json!({
        "event": "historyStateUpdated",
        "tabId": 2,
        "frameId": 0,
        "url": "https://www.youtube.com/watch?v=x"
    }))
    .unwrap();
    assert!(matches!(
        event,
        BrowserEvent::HistoryStateUpdated { details } if details.tab_id == Some(2)
    ));

    let event: BrowserEvent = serde_json::from_value(json!({"event": "refreshTick"})).unwrap();
    assert_eq!(event, BrowserEvent::RefreshTick);
}

// ─── Tab updates ───

#[tokio::test]
async fn relevant_update_reconciles_and_polls() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    fake.set_metrics(1, Ok(playing(100.0, 30.0)));
    let (app, _dir) = app_with(&fake);

    handle_browser_event(
        &app,
        BrowserEvent::TabUpdated {
            tab_id: 1,
            change_info: completed(),
            tab: Some(watch_tab(1, 1, 0)),
        },
    )
    .await;

    let state = app.state.lock();
    assert_eq!(state.window.tracked_window_id(), Some(1));
    assert_eq!(state.records.get(1).unwrap().fresh_remaining_time(), Some(70.0));
}

#[tokio::test]
async fn irrelevant_update_is_ignored() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);

    handle_browser_event(
        &app,
        BrowserEvent::TabUpdated {
            tab_id: 1,
            change_info: TabChangeInfo::default(),
            tab: Some(watch_tab(1, 1, 0)),
        },
    )
    .await;

    assert!(app.state.lock().records.is_empty());
}

#[tokio::test]
async fn update_from_untracked_window_is_ignored() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(5, 2, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(Some(1), false).await;
    fake.set_tabs(vec![watch_tab(1, 1, 0), watch_tab(3, 1, 1), watch_tab(5, 2, 0)]);

    handle_browser_event(
        &app,
        BrowserEvent::TabUpdated {
            tab_id: 5,
            change_info: completed(),
            tab: Some(watch_tab(5, 2, 0)),
        },
    )
    .await;

    assert_eq!(app.state.lock().records.ids(), vec![1]);
}

// ─── Removal ───

#[tokio::test]
async fn removed_tab_is_dropped() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 1, 1)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;

    handle_browser_event(
        &app,
        BrowserEvent::TabRemoved {
            tab_id: 1,
            remove_info: RemoveInfo {
                window_id: Some(1),
                is_window_closing: false,
            },
        },
    )
    .await;

    let state = app.state.lock();
    assert_eq!(state.records.ids(), vec![2]);
    assert_eq!(state.ordering.current_order, vec![2]);
    assert_eq!(state.window.tracked_window_id(), Some(1));
}

#[tokio::test]
async fn closing_tracked_window_resets_state() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 1, 1)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;

    handle_browser_event(
        &app,
        BrowserEvent::TabRemoved {
            tab_id: 1,
            remove_info: RemoveInfo {
                window_id: Some(1),
                is_window_closing: true,
            },
        },
    )
    .await;

    let state = app.state.lock();
    assert!(state.records.is_empty());
    assert_eq!(state.window.tracked_window_id(), None);
    assert!(state.ordering.current_order.is_empty());
}

#[tokio::test]
async fn removal_in_other_window_is_ignored() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;

    handle_browser_event(
        &app,
        BrowserEvent::TabRemoved {
            tab_id: 1,
            remove_info: RemoveInfo {
                window_id: Some(2),
                is_window_closing: true,
            },
        },
    )
    .await;

    assert_eq!(app.state.lock().records.ids(), vec![1]);
}

#[tokio::test]
async fn replaced_tab_is_swapped_in() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;
    fake.set_tabs(vec![watch_tab(9, 1, 0)]);

    handle_browser_event(
        &app,
        BrowserEvent::TabReplaced {
            added_tab_id: 9,
            removed_tab_id: 1,
        },
    )
    .await;

    assert_eq!(app.state.lock().records.ids(), vec![9]);
}

#[tokio::test]
async fn detach_from_tracked_window_drops_record() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 1, 1)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;
    fake.update_tab(2, |t| {
        t.window_id = 2;
        t.index = Some(0);
    });

    handle_browser_event(
        &app,
        BrowserEvent::TabDetached {
            tab_id: 2,
            old_window_id: 1,
        },
    )
    .await;

    assert_eq!(app.state.lock().records.ids(), vec![1]);
}

#[tokio::test]
async fn move_updates_indices() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 1, 1)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;
    fake.update_tab(1, |t| t.index = Some(1));
    fake.update_tab(2, |t| t.index = Some(0));

    handle_browser_event(&app, BrowserEvent::TabMoved { tab_id: 1, window_id: 1 }).await;

    assert_eq!(app.state.lock().ordering.current_order, vec![2, 1]);
}

// ─── Windows ───

#[tokio::test]
async fn focus_change_retargets_tracking() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(5, 2, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(Some(1), false).await;

    handle_browser_event(&app, BrowserEvent::WindowFocusChanged { window_id: 2 }).await;
    {
        let state = app.state.lock();
        assert_eq!(state.window.tracked_window_id(), Some(2));
        assert_eq!(state.records.ids(), vec![5]);
    }

    handle_browser_event(
        &app,
        BrowserEvent::WindowFocusChanged {
            window_id: WINDOW_ID_NONE,
        },
    )
    .await;
    assert_eq!(app.state.lock().window.tracked_window_id(), Some(2));
}

#[tokio::test]
async fn removing_tracked_window_resets() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;

    handle_browser_event(&app, BrowserEvent::WindowRemoved { window_id: 7 }).await;
    assert_eq!(app.state.lock().records.ids(), vec![1]);

    handle_browser_event(&app, BrowserEvent::WindowRemoved { window_id: 1 }).await;
    let state = app.state.lock();
    assert!(state.records.is_empty());
    assert_eq!(state.window.tracked_window_id(), None);
}

// ─── Navigation and refresh ───

#[tokio::test]
async fn in_page_navigation_reconciles_and_polls() {
    let fake = FakeBrowser::new(vec![tab(1, 1, 0, "https://www.youtube.com/")]);
    fake.set_metrics(1, Ok(playing(60.0, 0.0)));
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;
    assert!(app.state.lock().records.is_empty());

    let url = "https://www.youtube.com/watch?v=new";
    fake.update_tab(1, |t| t.url = url.to_string());

    handle_browser_event(
        &app,
        BrowserEvent::HistoryStateUpdated {
            details: NavigationDetails {
                tab_id: Some(1),
                frame_id: 0,
                url: url.to_string(),
            },
        },
    )
    .await;

    assert_eq!(
        app.state.lock().records.get(1).unwrap().fresh_remaining_time(),
        Some(60.0)
    );
}

#[tokio::test]
async fn subframe_navigation_is_ignored() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);

    handle_browser_event(
        &app,
        BrowserEvent::HistoryStateUpdated {
            details: NavigationDetails {
                tab_id: Some(1),
                frame_id: 3,
                url: "https://www.youtube.com/watch?v=vid1".to_string(),
            },
        },
    )
    .await;

    assert!(app.state.lock().records.is_empty());
}

#[tokio::test]
async fn refresh_tick_polls_tracked_tabs() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 1, 1)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;
    fake.set_metrics(1, Ok(playing(100.0, 20.0)));
    fake.set_metrics(2, Ok(playing(100.0, 60.0)));

    handle_browser_event(&app, BrowserEvent::RefreshTick).await;

    let state = app.state.lock();
    assert_eq!(state.ordering.target_order, vec![2, 1]);
    assert_eq!(state.ordering.readiness_metrics.watch_tabs_ready_count, 2);
}
