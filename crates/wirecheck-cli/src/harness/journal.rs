//! Side-channel JSON-lines journal for post-run debugging.
//!
//! Every connection event, sent or received payload, and raw wire buffer
//! can be reconstructed from the journal after a run. It is diagnostic
//! only: write failures are logged and swallowed, never propagated into
//! the harness's functional behavior.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// One recordable event.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    Connected { port: u16 },
    ConnectFailed { port: u16, reason: String },
    Disconnected,
    Sent { id: &'a str, payload: &'a str, raw: String },
    Received { id: &'a str, payload: &'a str, raw: String },
    ReceiveFailed { reason: String },
    Dispatched { command: &'a str, passed: bool },
}

/// Envelope around an event: run id plus timestamp.
#[derive(Debug, Serialize)]
struct Entry<'a> {
    ts: DateTime<Utc>,
    run: Uuid,
    #[serde(flatten)]
    event: Event<'a>,
}

/// Appending JSON-lines journal. A disabled journal drops every event.
pub struct Journal {
    path: Option<PathBuf>,
    run: Uuid,
}

impl Journal {
    /// Journal appending to `path`; each run gets a fresh run id so
    /// appended runs stay distinguishable.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            run: Uuid::new_v4(),
        }
    }

    /// Journal that records nothing.
    pub fn disabled() -> Self {
        Self {
            path: None,
            run: Uuid::new_v4(),
        }
    }

    /// Append one event.
    pub fn record(&self, event: Event<'_>) {
        let Some(path) = &self.path else { return };

        let entry = Entry {
            ts: Utc::now(),
            run: self.run,
            event,
        };
        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to serialize journal entry: {e}");
                return;
            }
        };

        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(e) = appended {
            warn!(path = %path.display(), "failed to append journal entry: {e}");
        }
    }
}

/// Hex rendering of raw wire bytes for journal entries.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
