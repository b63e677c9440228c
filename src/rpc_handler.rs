//! Command handler for the TabSort host protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdio.
//! `handle_command` dispatches one typed command to the `App`; `respond`
//! turns its result into the reply every caller gets.

use serde_json::{json, Value};
use tracing::{error, info};

use crate::app::App;
use crate::types::errors::HandlerError;
use crate::types::messages::{Command, MessageSender};

/// Every tag `Command` understands.
pub const KNOWN_COMMANDS: &[&str] = &[
    "updateRecords",
    "sendRecords",
    "areTabsKnownSorted",
    "sortTabs",
    "activateTab",
    "reloadTab",
    "contentScriptReady",
    "metadataLoaded",
    "lightweightDetails",
    "logPopupMessage",
    "ping",
];

/// Runs one command. `Ok(Value::Null)` means "done, nothing to return".
pub async fn handle_command(
    app: &App,
    command: Command,
    sender: &MessageSender,
) -> Result<Value, HandlerError> {
    match command {
        // ─── Records ───
        Command::UpdateRecords { window_id } => {
            app.reconcile_for_ui(window_id).await;
            Ok(Value::Null)
        }
        Command::SendRecords { window_id } => {
            let snapshot = app.send_records(window_id).await;
            Ok(serde_json::to_value(snapshot)?)
        }
        Command::AreTabsKnownSorted { window_id } => {
            Ok(Value::Bool(app.are_tabs_known_sorted(window_id).await))
        }
        Command::SortTabs { window_id } => {
            app.sort_tabs(window_id).await;
            Ok(Value::Null)
        }

        // ─── Tab actions ───
        Command::ActivateTab { tab_id, window_id } => {
            app.activate_tab(tab_id, window_id).await;
            Ok(Value::Null)
        }
        Command::ReloadTab { tab_id, window_id } => {
            app.reload_tab(tab_id, window_id).await;
            Ok(Value::Null)
        }

        // ─── Content agents ───
        Command::ContentScriptReady => {
            if app.on_content_script_ready(sender).await {
                Ok(json!({"acknowledged": true}))
            } else {
                Ok(Value::Null)
            }
        }
        Command::MetadataLoaded => {
            app.on_metadata_loaded(sender).await;
            Ok(Value::Null)
        }
        Command::LightweightDetails { details } => {
            app.on_lightweight_details(&details, sender).await;
            Ok(Value::Null)
        }

        // ─── Misc ───
        Command::LogPopupMessage { level, info } => {
            if level.as_deref() == Some("error") {
                error!("[popup] {}", info);
            } else {
                info!("[popup] {}", info);
            }
            Ok(Value::Null)
        }
        Command::Ping => Ok(json!({"ok": true})),
    }
}

/// Uniform reply: `{ok: true}` for void results, `{ok: false, error}` on failure.
pub fn respond(label: &str, result: Result<Value, HandlerError>) -> Value {
    match result {
        Ok(Value::Null) => json!({"ok": true}),
        Ok(value) => value,
        Err(e) => {
            error!("handler \"{}\" failed: {}", label, e);
            json!({"ok": false, "error": e.to_string()})
        }
    }
}

/// Parses and runs one request body `{"command": {...}, "sender": {...}}`.
///
/// Returns `None` for commands nobody handles; those get no reply.
pub async fn dispatch(app: &App, request: &Value) -> Option<Value> {
    let Some(raw) = request.get("command") else {
        return Some(respond("?", Err(HandlerError::MissingParam("command"))));
    };
    let label = raw.get("message").and_then(Value::as_str)?;
    if !KNOWN_COMMANDS.contains(&label) {
        return None;
    }

    let sender: MessageSender = match request.get("sender") {
        Some(v) if !v.is_null() => match serde_json::from_value(v.clone()) {
            Ok(sender) => sender,
            Err(e) => return Some(respond(label, Err(HandlerError::InvalidParam(e.to_string())))),
        },
        _ => MessageSender::default(),
    };
    let command: Command = match serde_json::from_value(raw.clone()) {
        Ok(command) => command,
        Err(e) => return Some(respond(label, Err(HandlerError::InvalidParam(e.to_string())))),
    };

    Some(respond(label, handle_command(app, command, &sender).await))
}
