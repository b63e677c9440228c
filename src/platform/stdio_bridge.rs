//! `BrowserApi` over newline-delimited JSON.
//!
//! The host writes `{"call": n, "method": "tabs.query", "params": {...}}` lines
//! and the extension shim answers with `{"reply": n, "result": ...}` or
//! `{"reply": n, "error": "..."}` on the host's stdin.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::browser::BrowserApi;
use crate::types::errors::BrowserError;
use crate::types::messages::{OutboundEvent, VideoMetrics};
use crate::types::tab::{BrowserTab, TabId, TabQuery};

type PendingReply = oneshot::Sender<Result<Value, BrowserError>>;

/// Browser calls relayed through the extension shim.
pub struct StdioBrowser {
    outbound: mpsc::UnboundedSender<String>,
    pending: Mutex<HashMap<u64, PendingReply>>,
    next_call: AtomicU64,
    timeout: Duration,
}

impl StdioBrowser {
    /// `outbound` receives complete JSON lines; the caller owns writing them.
    pub fn new(outbound: mpsc::UnboundedSender<String>, timeout: Duration) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_call: AtomicU64::new(1),
            timeout,
        }
    }

    /// True for inbound lines that answer a browser call.
    pub fn is_reply(line: &Value) -> bool {
        line.get("reply").is_some()
    }

    /// Completes the matching in-flight call. Returns false for unknown ids.
    pub fn resolve_reply(&self, reply: &Value) -> bool {
        let Some(call_id) = reply.get("reply").and_then(Value::as_u64) else {
            return false;
        };
        let sender = match self.pending.lock() {
            Ok(mut pending) => pending.remove(&call_id),
            Err(_) => None,
        };
        let Some(sender) = sender else {
            debug!("reply for unknown or expired call {}", call_id);
            return false;
        };
        let result = match reply.get("error") {
            Some(err) if !err.is_null() => {
                let message = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
                Err(classify_error(&message))
            }
            _ => Ok(reply.get("result").cloned().unwrap_or(Value::Null)),
        };
        sender.send(result).is_ok()
    }

    /// Fails every in-flight call, e.g. once stdin closes.
    pub fn disconnect(&self) {
        let drained: Vec<PendingReply> = match self.pending.lock() {
            Ok(mut pending) => pending.drain().map(|(_, tx)| tx).collect(),
            Err(_) => Vec::new(),
        };
        for tx in drained {
            let _ = tx.send(Err(BrowserError::Disconnected));
        }
    }

    fn forget(&self, call_id: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&call_id);
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, BrowserError> {
        let call_id = self.next_call.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| BrowserError::Disconnected)?
            .insert(call_id, tx);

        let line = json!({"call": call_id, "method": method, "params": params}).to_string();
        if self.outbound.send(line).is_err() {
            self.forget(call_id);
            return Err(BrowserError::Disconnected);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BrowserError::Disconnected),
            Err(_) => {
                self.forget(call_id);
                Err(BrowserError::Timeout(self.timeout.as_millis() as u64))
            }
        }
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, BrowserError> {
        let value = self.call(method, params).await?;
        if value.is_null() {
            return Err(BrowserError::Protocol(format!("{} returned nothing", method)));
        }
        serde_json::from_value(value).map_err(|e| BrowserError::Protocol(e.to_string()))
    }
}

/// Maps the shim's error text onto the error taxonomy.
pub fn classify_error(message: &str) -> BrowserError {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("receiving end") || lowered.contains("could not establish connection") {
        BrowserError::NoReceiver
    } else {
        BrowserError::Rejected(message.to_string())
    }
}

#[async_trait]
impl BrowserApi for StdioBrowser {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<BrowserTab>, BrowserError> {
        let value = self.call("tabs.query", query.to_params()).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<BrowserTab, BrowserError> {
        match self.call_typed("tabs.get", json!({ "tabId": tab_id })).await {
            Err(BrowserError::Protocol(_)) => Err(BrowserError::TabNotFound(tab_id)),
            other => other,
        }
    }

    async fn move_tab(&self, tab_id: TabId, index: usize) -> Result<(), BrowserError> {
        self.call("tabs.move", json!({ "tabId": tab_id, "index": index }))
            .await
            .map(|_| ())
    }

    async fn activate_tab(&self, tab_id: TabId) -> Result<(), BrowserError> {
        self.call("tabs.update", json!({ "tabId": tab_id, "active": true }))
            .await
            .map(|_| ())
    }

    async fn reload_tab(&self, tab_id: TabId) -> Result<(), BrowserError> {
        self.call("tabs.reload", json!({ "tabId": tab_id }))
            .await
            .map(|_| ())
    }

    async fn request_video_metrics(&self, tab_id: TabId) -> Result<VideoMetrics, BrowserError> {
        let params = json!({ "tabId": tab_id, "message": { "message": "getVideoMetrics" } });
        self.call_typed("tabs.sendMessage", params).await
    }

    async fn broadcast(&self, event: &OutboundEvent) -> Result<(), BrowserError> {
        let message = serde_json::to_value(event).map_err(|e| BrowserError::Protocol(e.to_string()))?;
        self.call("runtime.sendMessage", json!({ "message": message }))
            .await
            .map(|_| ())
    }
}
