//! TabSort host: newline-delimited JSON over stdin/stdout, spoken with the extension shim.
//!
//! Inbound lines:
//!   command: {"id": 1, "command": {"message": "sortTabs", ...}, "sender": {"tab": {...}}}
//!   event:   {"event": "tabUpdated", "tabId": 3, ...}
//!   reply:   {"reply": 7, "result": ...} answering a browser call
//! Outbound lines:
//!   response: {"id": 1, "result": {...}}
//!   call:     {"call": 7, "method": "tabs.query", "params": {...}}
//! Logs go to stderr; stdout carries protocol only.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tabsort::app::App;
use tabsort::event_handler::handle_browser_event;
use tabsort::platform::stdio_bridge::StdioBrowser;
use tabsort::rpc_handler::dispatch;
use tabsort::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use tabsort::types::events::BrowserEvent;

const LOG_ENV: &str = "TABSORT_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let mut settings_engine = SettingsEngine::new(None);
    let settings = match settings_engine.load() {
        Ok(s) => s,
        Err(e) => {
            warn!("settings unavailable, using defaults: {}", e);
            Default::default()
        }
    };

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(line) = out_rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                break;
            }
        }
    });

    let bridge = Arc::new(StdioBrowser::new(
        out_tx.clone(),
        Duration::from_millis(settings.bridge.call_timeout_ms),
    ));
    let app = App::new(bridge.clone(), settings_engine);

    // Signal ready
    let _ = out_tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}).to_string());
    info!("tabsort host {} ready", env!("CARGO_PKG_VERSION"));

    let refresh_app = app.clone();
    let refresh_period = settings.refresh.period();
    let refresh = tokio::spawn(async move { refresh_app.run_refresh_loop(refresh_period).await });

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                warn!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                debug!("unparsable line ignored: {}", e);
                continue;
            }
        };

        if StdioBrowser::is_reply(&msg) {
            bridge.resolve_reply(&msg);
            continue;
        }

        if msg.get("event").is_some() {
            match serde_json::from_value::<BrowserEvent>(msg) {
                Ok(event) => {
                    let app = app.clone();
                    tokio::spawn(async move { handle_browser_event(&app, event).await });
                }
                Err(e) => debug!("unknown browser event ignored: {}", e),
            }
            continue;
        }

        let id = msg.get("id").cloned().unwrap_or(Value::Null);
        let app = app.clone();
        let out = out_tx.clone();
        tokio::spawn(async move {
            if let Some(result) = dispatch(&app, &msg).await {
                let _ = out.send(json!({"id": id, "result": result}).to_string());
            }
        });
    }

    info!("stdin closed, shutting down");
    bridge.disconnect();
    refresh.abort();
    drop(app);
    drop(bridge);
    drop(out_tx);
    let _ = writer.await;
}
