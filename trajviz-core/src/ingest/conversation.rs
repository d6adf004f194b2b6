//! Loading a single conversation directory.
//!
//! # Error Handling
//!
//! - **Missing or unparseable `base_state.json`**: the whole conversation is
//!   rejected with [`Error::BaseState`]; the caller skips it and moves on.
//! - **Malformed event file**: logged as a warning, recorded in
//!   [`LoadedConversation::diagnostics`], and left out of `events`. It still
//!   counts toward [`LoadedConversation::event_files`].
//! - **Unreadable `events/` entry**: logged and recorded as a diagnostic; it
//!   does not count as an event file.
//! - **Missing `events/` directory**: the conversation simply has no events.

use crate::error::{Error, Result};
use crate::types::{BaseState, Diagnostic, DiagnosticKind, RawEvent};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const BASE_STATE_FILE: &str = "base_state.json";
pub const EVENTS_DIR: &str = "events";

/// A conversation read from disk, before any metrics are computed.
#[derive(Debug, Clone)]
pub struct LoadedConversation {
    pub id: String,
    pub path: PathBuf,
    /// Directory modification time
    pub created: DateTime<Utc>,
    pub base_state: BaseState,
    /// Events that parsed, in filename order
    pub events: Vec<RawEvent>,
    /// Number of event files found, parsed or not
    pub event_files: usize,
    /// Events that were skipped
    pub diagnostics: Vec<Diagnostic>,
}

fn read_base_state(path: &Path) -> Result<BaseState> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::BaseState {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| Error::BaseState {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    BaseState::from_value(value).ok_or_else(|| Error::BaseState {
        path: path.to_path_buf(),
        message: "expected a JSON object".to_string(),
    })
}

fn read_event(path: &Path) -> Result<RawEvent> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Event {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| Error::Event {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Event files of a conversation, sorted by filename.
///
/// Directory entries that cannot be read are reported in `diagnostics`.
fn event_files(dir: &Path, id: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<Vec<PathBuf>> {
    let events_dir = dir.join(EVENTS_DIR);
    if !events_dir.is_dir() {
        return Ok(vec![]);
    }

    let pattern = format!(
        "{}/event-*.json",
        glob::Pattern::escape(&events_dir.to_string_lossy())
    );
    let entries = glob::glob(&pattern)?.map(|entry| {
        entry.map_err(|e| Error::Event {
            path: e.path().to_path_buf(),
            message: e.error().to_string(),
        })
    });
    Ok(collect_event_files(id, entries, diagnostics))
}

fn collect_event_files<I>(id: &str, entries: I, diagnostics: &mut Vec<Diagnostic>) -> Vec<PathBuf>
where
    I: IntoIterator<Item = Result<PathBuf>>,
{
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                let path = match &e {
                    Error::Event { path, .. } => path.clone(),
                    _ => PathBuf::new(),
                };
                tracing::warn!(
                    conversation = %id,
                    path = %path.display(),
                    error = %e,
                    "Unreadable event entry"
                );
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::EventSkipped,
                    conversation_id: Some(id.to_string()),
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    files.sort();
    files
}

/// Load one conversation directory.
pub fn load_conversation(dir: &Path) -> Result<LoadedConversation> {
    let id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base_state = read_base_state(&dir.join(BASE_STATE_FILE))?;

    let created = std::fs::metadata(dir)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let mut diagnostics = Vec::new();
    let files = event_files(dir, &id, &mut diagnostics)?;
    let mut events = Vec::with_capacity(files.len());

    for file in &files {
        match read_event(file) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(
                    conversation = %id,
                    path = %file.display(),
                    error = %e,
                    "Skipping malformed event"
                );
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::EventSkipped,
                    conversation_id: Some(id.clone()),
                    path: file.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(LoadedConversation {
        id,
        path: dir.to_path_buf(),
        created,
        base_state,
        events,
        event_files: files.len(),
        diagnostics,
    })
}
