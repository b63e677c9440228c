// Suggests what the user should do with a tab whose remaining time is missing or stale.

use crate::types::messages::UserAction;
use crate::types::record::{TabRecord, TabStatus};

/// A tab unsuspended this recently is still expected to report on its own.
pub const RECENTLY_UNSUSPENDED_MS: u64 = 5000;

/// Stale beats everything, then live streams and known times need nothing,
/// then the load status decides.
pub fn determine_user_action(record: &TabRecord, now_ms: u64) -> UserAction {
    if record.remaining_time_may_be_stale {
        return UserAction::ViewTabToRefreshTime;
    }
    if record.is_live_stream {
        return UserAction::None;
    }
    if record.remaining_time().is_some_and(|t| t.is_finite()) {
        return UserAction::None;
    }

    let recently_unsuspended = record
        .unsuspended_timestamp
        .is_some_and(|ts| now_ms.saturating_sub(ts) < RECENTLY_UNSUSPENDED_MS);

    match record.status {
        Some(TabStatus::Unsuspended) if recently_unsuspended => UserAction::None,
        Some(TabStatus::Unsuspended) if record.is_active_tab || !record.content_script_ready => {
            UserAction::ReloadTab
        }
        Some(TabStatus::Unsuspended) => UserAction::InteractWithTabThenReload,
        Some(TabStatus::Suspended) => UserAction::InteractWithTab,
        Some(TabStatus::Loading) => UserAction::FacilitateLoad,
        None => UserAction::None,
    }
}
