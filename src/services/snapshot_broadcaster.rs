//! Pushes a read-only copy of records and ordering to any listening UI.
//!
//! Sends are deduplicated by a SHA-256 signature of the serialized snapshot.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::digest;
use tracing::warn;

use crate::managers::background_state::{now_millis, BackgroundState, SharedState};
use crate::platform::browser::BrowserApi;
use crate::services::user_action::determine_user_action;
use crate::types::messages::{OutboundEvent, TabSnapshot};

/// Result of one broadcast attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Signature unchanged since the last send.
    Skipped,
    Sent,
    /// No UI is listening.
    NoListener,
    Failed,
}

/// Copies the current records and ordering into a snapshot.
pub fn build_snapshot(state: &BackgroundState, now_ms: u64) -> TabSnapshot {
    let records = state.records.as_map().clone();
    let suggested_actions = records
        .values()
        .map(|record| (record.id, determine_user_action(record, now_ms)))
        .collect();

    TabSnapshot {
        records,
        target_order: state.ordering.target_order.clone(),
        current_order: state.ordering.current_order.clone(),
        is_fully_sorted: state.ordering.is_fully_sorted,
        readiness_metrics: state.ordering.readiness_metrics.clone(),
        suggested_actions,
    }
}

/// Base64 SHA-256 over the stable JSON form (records are keyed in a BTreeMap).
pub fn snapshot_signature(snapshot: &TabSnapshot) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(snapshot)?;
    let hash = digest::digest(&digest::SHA256, &bytes);
    Ok(BASE64.encode(hash.as_ref()))
}

/// Sends the current snapshot unless it matches the last one sent.
pub async fn broadcast_snapshot(
    state: &SharedState,
    browser: &dyn BrowserApi,
    force: bool,
) -> BroadcastOutcome {
    let (event, signature) = {
        let mut guard = state.lock();
        let snapshot = build_snapshot(&guard, now_millis());
        let signature = match snapshot_signature(&snapshot) {
            Ok(sig) => sig,
            Err(e) => {
                warn!("could not sign snapshot: {}", e);
                return BroadcastOutcome::Failed;
            }
        };
        if !force && guard.last_broadcast_signature.as_deref() == Some(signature.as_str()) {
            return BroadcastOutcome::Skipped;
        }
        guard.last_broadcast_signature = Some(signature.clone());
        (OutboundEvent::TabRecordsUpdated(snapshot), signature)
    };

    match browser.broadcast(&event).await {
        Ok(()) => BroadcastOutcome::Sent,
        Err(e) if e.is_no_receiver() => BroadcastOutcome::NoListener,
        Err(e) => {
            warn!("broadcast warning: {}", e);
            // Let the next recompute retry the same content.
            let mut guard = state.lock();
            if guard.last_broadcast_signature.as_deref() == Some(signature.as_str()) {
                guard.last_broadcast_signature = None;
            }
            BroadcastOutcome::Failed
        }
    }
}

/// Re-derives ordering from the store, then broadcasts if anything changed.
pub async fn recompute_and_broadcast(state: &SharedState, browser: &dyn BrowserApi) -> BroadcastOutcome {
    state.lock().recompute_ordering();
    broadcast_snapshot(state, browser, false).await
}
