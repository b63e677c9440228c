//! In-memory table of watch/shorts tab records for the tracked window.

use std::collections::{BTreeMap, HashSet};

use crate::services::url_patterns::is_watch_url;
use crate::types::record::{TabRecord, TabStatus};
use crate::types::tab::{BrowserTab, TabId, WindowId};

/// Submission-order token for one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReconcileTicket(u64);

/// Authoritative record set, keyed by tab id.
#[derive(Debug, Clone, Default)]
pub struct TabRecordStore {
    records: BTreeMap<TabId, TabRecord>,
    reconcile_seq: u64,
}

impl TabRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a reconcile pass. Any ticket issued earlier becomes stale.
    pub fn begin_reconcile(&mut self) -> ReconcileTicket {
        self.reconcile_seq += 1;
        ReconcileTicket(self.reconcile_seq)
    }

    /// True while no later reconcile has been started.
    pub fn is_current(&self, ticket: ReconcileTicket) -> bool {
        ticket.0 == self.reconcile_seq
    }

    /// Folds a fetched tab list into the store.
    ///
    /// Returns false, leaving the store untouched, when a newer reconcile was
    /// started after `ticket` was issued.
    pub fn apply_reconcile(&mut self, ticket: ReconcileTicket, tabs: &[BrowserTab], now_ms: u64) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let mut seen = HashSet::new();
        for tab in tabs.iter().filter(|t| is_watch_url(&t.url)) {
            seen.insert(tab.id);
            let merged = merge_tab(self.records.get(&tab.id), tab, now_ms);
            self.records.insert(tab.id, merged);
        }
        self.records.retain(|id, _| seen.contains(id));
        true
    }

    /// Returns the record for `tab_id`, creating a bare one if needed.
    ///
    /// Content agents can announce themselves before the first reconcile has
    /// seen their tab; the next reconcile fills in the rest or drops it.
    pub fn ensure_record(
        &mut self,
        tab_id: TabId,
        sender_window_id: Option<WindowId>,
        default_url: Option<&str>,
    ) -> &mut TabRecord {
        let record = self
            .records
            .entry(tab_id)
            .or_insert_with(|| TabRecord::new(tab_id, sender_window_id));
        if sender_window_id.is_some() {
            record.window_id = sender_window_id;
        }
        if record.url.is_empty() {
            if let Some(url) = default_url {
                record.url = url.to_string();
            }
        }
        record
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabRecord> {
        self.records.get(&tab_id)
    }

    pub fn get_mut(&mut self, tab_id: TabId) -> Option<&mut TabRecord> {
        self.records.get_mut(&tab_id)
    }

    pub fn insert(&mut self, record: TabRecord) {
        self.records.insert(record.id, record);
    }

    pub fn remove(&mut self, tab_id: TabId) -> Option<TabRecord> {
        self.records.remove(&tab_id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.records.keys().copied().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &TabRecord> {
        self.records.values()
    }

    pub fn as_map(&self) -> &BTreeMap<TabId, TabRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Merges a live tab observation into its previous record.
pub fn merge_tab(prev: Option<&TabRecord>, tab: &BrowserTab, now_ms: u64) -> TabRecord {
    let next_status = TabStatus::from_tab(tab);
    let prev_status = prev.and_then(|p| p.status);
    let url_changed = prev.is_some_and(|p| !p.url.is_empty() && p.url != tab.url);
    let status_changed = prev_status.is_some_and(|s| s != next_status);

    let mut record = prev
        .cloned()
        .unwrap_or_else(|| TabRecord::new(tab.id, Some(tab.window_id)));

    if url_changed {
        record.metadata_loaded = false;
        record.is_live_stream = false;
        record.video_details = None;
    }

    let keep_ready = prev_status == Some(TabStatus::Unsuspended)
        && next_status == TabStatus::Unsuspended
        && !url_changed;
    record.content_script_ready = record.content_script_ready && keep_ready;

    if next_status == TabStatus::Unsuspended && prev_status != Some(TabStatus::Unsuspended) {
        record.unsuspended_timestamp = Some(now_ms);
    }

    let forced_stale = next_status != TabStatus::Unsuspended || status_changed || url_changed;
    if forced_stale {
        record.clear_remaining_time();
    }
    record.remaining_time_may_be_stale = forced_stale || record.remaining_time_may_be_stale;

    record.window_id = Some(tab.window_id);
    record.url = tab.url.clone();
    record.index = tab.index;
    record.pinned = tab.pinned;
    record.status = Some(next_status);
    record.is_active_tab = tab.active;
    record.is_hidden = tab.hidden;
    record
}

/// Concatenates query results, keeping the first sighting of each tab id.
pub fn dedupe_tabs(batches: impl IntoIterator<Item = Vec<BrowserTab>>) -> Vec<BrowserTab> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tab in batches.into_iter().flatten() {
        if seen.insert(tab.id) {
            out.push(tab);
        }
    }
    out
}
