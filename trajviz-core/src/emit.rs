//! Artifact emission
//!
//! Writes a [`BuildResult`] as the static data the viewer loads:
//!
//! ```text
//! <output>/data/
//! ├── trajectories.json    conversation index
//! ├── models.json          per-model rollups
//! ├── config.json          source directory status
//! └── <id>/
//!     ├── events.json      normalized events
//!     └── trajectory.json  detail with the raw base state
//! ```
//!
//! Every build rewrites all artifacts. Conversation directories left over from
//! earlier builds are removed.

use crate::error::Result;
use crate::pipeline::BuildResult;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data";
pub const INDEX_FILE: &str = "trajectories.json";
pub const MODELS_FILE: &str = "models.json";
pub const STATUS_FILE: &str = "config.json";
pub const EVENTS_FILE: &str = "events.json";
pub const DETAIL_FILE: &str = "trajectory.json";

/// What an emit pass did.
#[derive(Debug, Default)]
pub struct EmitReport {
    pub data_dir: PathBuf,
    pub conversations_written: usize,
    /// Stale conversation directories removed
    pub removed: Vec<String>,
}

/// Writes build artifacts under an output directory.
pub struct ArtifactEmitter {
    output_dir: PathBuf,
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

impl ArtifactEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join(DATA_DIR)
    }

    /// Write every artifact for `result`.
    pub fn emit(&self, result: &BuildResult) -> Result<EmitReport> {
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let mut current: HashSet<&str> = HashSet::new();
        for conversation in &result.conversations {
            let id = conversation.summary.id.as_str();
            current.insert(id);

            let dir = data_dir.join(id);
            std::fs::create_dir_all(&dir)?;
            write_json(&dir.join(EVENTS_FILE), &conversation.events)?;
            write_json(&dir.join(DETAIL_FILE), &conversation.detail)?;
        }

        let removed = self.remove_stale(&data_dir, &current)?;

        write_json(&data_dir.join(INDEX_FILE), &result.summaries())?;
        write_json(&data_dir.join(MODELS_FILE), &result.models)?;
        write_json(&data_dir.join(STATUS_FILE), &result.status())?;

        tracing::info!(
            data_dir = %data_dir.display(),
            conversations = result.conversations.len(),
            removed = removed.len(),
            "Artifacts written"
        );

        Ok(EmitReport {
            data_dir,
            conversations_written: result.conversations.len(),
            removed,
        })
    }

    fn remove_stale(&self, data_dir: &Path, current: &HashSet<&str>) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if current.contains(name.as_str()) {
                continue;
            }

            tracing::debug!(path = %path.display(), "Removing stale conversation output");
            std::fs::remove_dir_all(&path)?;
            removed.push(name);
        }
        removed.sort();
        Ok(removed)
    }
}
