//! Batch build over a conversations directory.
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────────────────┐   ┌──────────────────┐
//! │ conversations/   │──►│ per conversation        │──►│ aggregate_models │
//! │  <id>/...        │   │  ├─ normalize_events    │   └──────────────────┘
//! └──────────────────┘   │  └─ ConversationSummary │
//!                        └─────────────────────────┘
//! ```
//!
//! Each conversation is processed independently, optionally on the rayon pool.
//! Results are collected in discovery order, then the model rollup folds over
//! the finished summaries. Failures of individual conversations or events end
//! up in [`BuildResult::diagnostics`]; only an unreadable conversations
//! directory fails the build.

use crate::analytics::{aggregate_models, ConversationSummarizer};
use crate::config::TimingConfig;
use crate::error::Result;
use crate::ingest::{discover_conversations, load_conversation, ConversationsDir};
use crate::normalize::normalize_events;
use crate::types::{
    ConversationSummary, Diagnostic, DiagnosticKind, ModelStatsEntry, NormalizedEvent,
    SourceStatus, TrajectoryDetail,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Options for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub source: ConversationsDir,
    pub timing: TimingConfig,
    /// Use the rayon pool across conversations
    pub parallel: bool,
}

/// Everything produced for one conversation.
#[derive(Debug, Clone)]
pub struct ConversationOutput {
    pub summary: ConversationSummary,
    pub events: Vec<NormalizedEvent>,
    pub detail: TrajectoryDetail,
}

/// Result of a full build.
#[derive(Debug)]
pub struct BuildResult {
    pub source: ConversationsDir,
    /// Built conversations, most recently modified first
    pub conversations: Vec<ConversationOutput>,
    pub models: Vec<ModelStatsEntry>,
    /// Conversation directories that were found but skipped
    pub skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildResult {
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations.iter().map(|c| c.summary.clone()).collect()
    }

    pub fn status(&self) -> SourceStatus {
        SourceStatus {
            static_mode: true,
            is_custom_dir: self.source.is_custom,
            directory_name: self.source.display_name(),
        }
    }

    /// Total normalized events across conversations
    pub fn event_count(&self) -> usize {
        self.conversations.iter().map(|c| c.events.len()).sum()
    }
}

enum Outcome {
    Built(Box<ConversationOutput>, Vec<Diagnostic>),
    Skipped(Diagnostic),
}

fn process_conversation(dir: &Path, timing: &TimingConfig) -> Outcome {
    let loaded = match load_conversation(dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Skipping conversation");
            return Outcome::Skipped(Diagnostic {
                kind: DiagnosticKind::ConversationSkipped,
                conversation_id: dir.file_name().map(|n| n.to_string_lossy().into_owned()),
                path: dir.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let summary = ConversationSummarizer::new(timing).summarize(
        &loaded.id,
        loaded.created,
        &loaded.base_state,
        &loaded.events,
        loaded.event_files,
    );
    let events = normalize_events(&loaded.events);

    tracing::debug!(
        conversation = %loaded.id,
        events = events.len(),
        skipped_events = loaded.diagnostics.len(),
        "Processed conversation"
    );

    let detail = TrajectoryDetail {
        id: loaded.id,
        created: loaded.created,
        event_count: loaded.event_files,
        model: loaded.base_state.model,
        base_state: loaded.base_state.raw,
    };

    Outcome::Built(
        Box::new(ConversationOutput {
            summary,
            events,
            detail,
        }),
        loaded.diagnostics,
    )
}

/// Run the pipeline without writing anything.
pub fn run(options: &BuildOptions) -> Result<BuildResult> {
    run_with_progress(options, |_total, _path| {})
}

/// Run the pipeline, calling `on_progress(total, dir)` as each conversation
/// finishes. With `parallel` set the callback runs on worker threads.
pub fn run_with_progress<F>(options: &BuildOptions, on_progress: F) -> Result<BuildResult>
where
    F: Fn(usize, &Path) + Sync,
{
    let root = &options.source.path;
    let mut diagnostics = Vec::new();

    if !root.is_dir() {
        tracing::warn!(path = %root.display(), "Conversations directory not found");
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::MissingInput,
            conversation_id: None,
            path: root.clone(),
            message: "conversations directory not found".to_string(),
        });
    }

    let dirs = discover_conversations(root)?;
    tracing::info!(
        path = %root.display(),
        conversations = dirs.len(),
        parallel = options.parallel,
        "Building conversations"
    );

    let total = dirs.len();
    let process = |dir: &PathBuf| {
        let outcome = process_conversation(dir, &options.timing);
        on_progress(total, dir);
        outcome
    };

    let outcomes: Vec<Outcome> = if options.parallel {
        dirs.par_iter().map(process).collect()
    } else {
        dirs.iter().map(process).collect()
    };

    let mut conversations = Vec::with_capacity(outcomes.len());
    let mut skipped = 0;
    for outcome in outcomes {
        match outcome {
            Outcome::Built(output, mut event_diagnostics) => {
                conversations.push(*output);
                diagnostics.append(&mut event_diagnostics);
            }
            Outcome::Skipped(diagnostic) => {
                skipped += 1;
                diagnostics.push(diagnostic);
            }
        }
    }

    let summaries: Vec<ConversationSummary> =
        conversations.iter().map(|c| c.summary.clone()).collect();
    let models = aggregate_models(&summaries);

    tracing::info!(
        built = conversations.len(),
        skipped,
        models = models.len(),
        diagnostics = diagnostics.len(),
        "Build complete"
    );

    Ok(BuildResult {
        source: options.source.clone(),
        conversations,
        models,
        skipped,
        diagnostics,
    })
}
