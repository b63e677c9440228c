//! Record store and reconcile tests: merge rules, window gating and the
//! submission-order guard.

#[path = "../common/fake_browser.rs"]
mod fake_browser;

use std::time::Duration;

use fake_browser::*;
use tabsort::managers::record_store::{merge_tab, TabRecordStore};
use tabsort::managers::window_tracker::WindowTrackerTrait;
use tabsort::services::reconciler::ReconcileOutcome;
use tabsort::types::errors::BrowserError;
use tabsort::types::record::TabStatus;

// ─── Store helpers ───

#[test]
fn ensure_record_fills_only_unset_fields() {
    let mut store = TabRecordStore::new();
    store.ensure_record(5, Some(3), Some("https://www.youtube.com/watch?v=a"));
    let record = store.ensure_record(5, Some(4), Some("https://www.youtube.com/watch?v=b"));
    assert_eq!(record.window_id, Some(4));
    assert_eq!(record.url, "https://www.youtube.com/watch?v=a");
    assert_eq!(store.len(), 1);
}

#[test]
fn ready_flag_survives_only_steady_unsuspended() {
    let tab = watch_tab(1, 1, 0);
    let mut record = merge_tab(None, &tab, 1_000);
    assert_eq!(record.unsuspended_timestamp, Some(1_000));
    record.content_script_ready = true;

    let steady = merge_tab(Some(&record), &tab, 2_000);
    assert!(steady.content_script_ready);
    assert_eq!(steady.unsuspended_timestamp, Some(1_000));

    let discarded = suspended_watch_tab(1, 1, 0);
    let suspended = merge_tab(Some(&steady), &discarded, 3_000);
    assert!(!suspended.content_script_ready);
    assert_eq!(suspended.status, Some(TabStatus::Suspended));
}

#[test]
fn leaving_unsuspended_clears_remaining_time() {
    let mut record = merge_tab(None, &watch_tab(1, 1, 0), 1_000);
    record.video_details_mut().remaining_time = Some(42.0);

    let suspended = merge_tab(Some(&record), &suspended_watch_tab(1, 1, 0), 2_000);
    assert!(suspended.remaining_time_may_be_stale);
    assert_eq!(suspended.remaining_time(), None);

    // Back to unsuspended: new timestamp, still stale until polled.
    let resumed = merge_tab(Some(&suspended), &watch_tab(1, 1, 0), 3_000);
    assert_eq!(resumed.unsuspended_timestamp, Some(3_000));
    assert!(resumed.remaining_time_may_be_stale);
}

// ─── Reconcile ───

#[tokio::test]
async fn reconcile_keeps_watch_tabs_and_adopts_window() {
    let fake = FakeBrowser::new(vec![
        watch_tab(10, 1, 0),
        tab(11, 1, 1, "https://example.com/"),
        suspended_watch_tab(12, 1, 2),
        watch_tab(20, 2, 0),
    ]);
    let (app, _dir) = app_with(&fake);

    assert_eq!(app.reconcile(None, false).await, ReconcileOutcome::Applied);

    let state = app.state.lock();
    assert_eq!(state.window.tracked_window_id(), Some(1));
    assert_eq!(state.records.ids(), vec![10, 12]);

    let suspended = state.records.get(12).unwrap();
    assert_eq!(suspended.status, Some(TabStatus::Suspended));
    assert!(suspended.remaining_time_may_be_stale);

    let live = state.records.get(10).unwrap();
    assert_eq!(live.status, Some(TabStatus::Unsuspended));
    assert!(!live.remaining_time_may_be_stale);
    assert!(live.unsuspended_timestamp.is_some());
}

#[tokio::test]
async fn hidden_tabs_are_included_once() {
    let mut hidden = watch_tab(2, 1, 1);
    hidden.hidden = true;
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), hidden]);
    let (app, _dir) = app_with(&fake);

    app.reconcile(Some(1), false).await;

    let state = app.state.lock();
    assert_eq!(state.records.ids(), vec![1, 2]);
    assert!(state.records.get(2).unwrap().is_hidden);
}

#[tokio::test]
async fn unchanged_url_preserves_details_and_changed_url_resets_them() {
    let fake = FakeBrowser::new(vec![watch_tab(10, 1, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;
    {
        let mut state = app.state.lock();
        let record = state.records.get_mut(10).unwrap();
        record.metadata_loaded = true;
        let details = record.video_details_mut();
        details.title = Some("first".to_string());
        details.remaining_time = Some(30.0);
    }

    app.reconcile(None, false).await;
    {
        let state = app.state.lock();
        let record = state.records.get(10).unwrap();
        assert!(record.metadata_loaded);
        assert_eq!(record.video_details.as_ref().unwrap().title.as_deref(), Some("first"));
        assert_eq!(record.fresh_remaining_time(), Some(30.0));
    }

    fake.update_tab(10, |t| t.url = "https://www.youtube.com/watch?v=next".to_string());
    app.reconcile(None, false).await;

    let state = app.state.lock();
    let record = state.records.get(10).unwrap();
    assert!(!record.metadata_loaded);
    assert!(record.video_details.is_none());
    assert!(record.remaining_time_may_be_stale);
}

#[tokio::test]
async fn closed_tabs_are_dropped() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 1, 1)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;

    fake.set_tabs(vec![watch_tab(2, 1, 0)]);
    app.reconcile(None, false).await;

    assert_eq!(app.state.lock().records.ids(), vec![2]);
}

#[tokio::test]
async fn candidate_window_needs_force_to_retarget() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0), watch_tab(2, 2, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(Some(1), false).await;

    app.reconcile(Some(2), false).await;
    assert_eq!(app.state.lock().records.ids(), vec![1]);

    app.reconcile(Some(2), true).await;
    let state = app.state.lock();
    assert_eq!(state.window.tracked_window_id(), Some(2));
    assert_eq!(state.records.ids(), vec![2]);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_records() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);
    app.reconcile(None, false).await;

    *fake.query_error.lock().unwrap() = Some(BrowserError::Disconnected);
    assert_eq!(app.reconcile(None, false).await, ReconcileOutcome::FetchFailed);
    assert_eq!(app.state.lock().records.ids(), vec![1]);
}

#[tokio::test]
async fn empty_result_without_window_is_a_no_op() {
    let fake = FakeBrowser::new(vec![]);
    let (app, _dir) = app_with(&fake);

    assert_eq!(app.reconcile(None, false).await, ReconcileOutcome::NoTarget);
    assert_eq!(app.state.lock().window.tracked_window_id(), None);
}

#[tokio::test(start_paused = true)]
async fn older_reconcile_never_overwrites_newer_one() {
    let fake = FakeBrowser::new(vec![watch_tab(1, 1, 0)]);
    let (app, _dir) = app_with(&fake);
    fake.query_delays
        .lock()
        .unwrap()
        .extend([Duration::from_millis(500), Duration::from_millis(500)]);

    let first = {
        let app = app.clone();
        tokio::spawn(async move { app.reconcile(Some(1), false).await })
    };
    while fake.queries_issued() < 2 {
        tokio::task::yield_now().await;
    }

    fake.set_tabs(vec![watch_tab(2, 1, 0)]);
    assert_eq!(app.reconcile(Some(1), false).await, ReconcileOutcome::Applied);
    assert_eq!(first.await.unwrap(), ReconcileOutcome::Superseded);

    assert_eq!(app.state.lock().records.ids(), vec![2]);
}
