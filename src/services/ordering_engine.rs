//! Pure derivation of display order, target order and readiness metrics.
//!
//! Unknown-remaining-time tabs keep their relative order at the tail of the
//! target order; only tabs with a fresh measurement move.

use crate::types::ordering::{OrderingState, ReadinessMetrics};
use crate::types::record::TabRecord;
use crate::types::tab::TabId;

/// Computes the ordering state for a record set.
pub fn compute_ordering_state<'a>(records: impl IntoIterator<Item = &'a TabRecord>) -> OrderingState {
    let mut all: Vec<&TabRecord> = records.into_iter().collect();
    sort_by_index(&mut all);
    let current_order: Vec<TabId> = all.iter().map(|r| r.id).collect();

    // Already in index order, so the filter preserves it.
    let sortable: Vec<&TabRecord> = all.iter().copied().filter(|r| r.is_sortable()).collect();
    let sortable_order: Vec<TabId> = sortable.iter().map(|r| r.id).collect();

    let mut known: Vec<(TabId, f64)> = Vec::new();
    let mut unknown: Vec<TabId> = Vec::new();
    for record in &sortable {
        match record.fresh_remaining_time() {
            Some(remaining) => known.push((record.id, remaining)),
            None => unknown.push(record.id),
        }
    }
    // Stable: equal remaining times keep their current relative order.
    known.sort_by(|a, b| a.1.total_cmp(&b.1));

    let target_order: Vec<TabId> = known
        .iter()
        .map(|(id, _)| *id)
        .chain(unknown.iter().copied())
        .collect();

    let is_fully_sorted =
        !sortable_order.is_empty() && unknown.is_empty() && sortable_order == target_order;

    OrderingState {
        current_order,
        target_order,
        is_fully_sorted,
        readiness_metrics: build_readiness_metrics(&sortable),
    }
}

/// Index ascending; missing indices last; ties by tab id.
pub fn sort_by_index(records: &mut [&TabRecord]) {
    records.sort_by_key(|r| (r.index.unwrap_or(i64::MAX), r.id));
}

/// Readiness counters over sortable records given in current order.
pub fn build_readiness_metrics(sortable_in_order: &[&TabRecord]) -> ReadinessMetrics {
    if sortable_in_order.is_empty() {
        return ReadinessMetrics::default();
    }

    let total = sortable_in_order.len();
    let mut metrics = ReadinessMetrics {
        total_watch_tabs_in_window: total,
        ..ReadinessMetrics::default()
    };

    let mut ready_in_order: Vec<(TabId, f64)> = Vec::new();
    let mut encountered_ready = false;
    let mut non_ready_before_ready = false;
    let mut gap_after_ready = false;

    for record in sortable_in_order {
        if record.remaining_time_may_be_stale {
            metrics.hidden_tabs_may_have_stale_remaining = true;
        }

        match record.fresh_remaining_time() {
            Some(remaining) => {
                ready_in_order.push((record.id, remaining));
                encountered_ready = true;
                if gap_after_ready {
                    metrics.ready_tabs_are_contiguous = false;
                }
            }
            None if encountered_ready => gap_after_ready = true,
            None => non_ready_before_ready = true,
        }
    }

    metrics.watch_tabs_ready_count = ready_in_order.len();
    metrics.ready_tabs_are_at_front = !(encountered_ready && non_ready_before_ready);

    let current_ready_ids: Vec<TabId> = ready_in_order.iter().map(|(id, _)| *id).collect();
    let mut by_remaining = ready_in_order.clone();
    by_remaining.sort_by(|a, b| a.1.total_cmp(&b.1));
    let ready_ids_by_remaining: Vec<TabId> = by_remaining.iter().map(|(id, _)| *id).collect();

    if current_ready_ids.len() >= 2 {
        metrics.known_watch_tabs_out_of_order = current_ready_ids != ready_ids_by_remaining;
    }

    metrics.all_known = total > 1 && metrics.watch_tabs_ready_count == total;
    let ordered_ids: Vec<TabId> = sortable_in_order.iter().map(|r| r.id).collect();
    metrics.computed_all_sorted = metrics.all_known && ordered_ids == ready_ids_by_remaining;
    metrics
}
