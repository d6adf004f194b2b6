//! trajviz-stats - print per-model rollups and the conversation list
//!
//! Runs the same pipeline as `trajviz` but writes nothing to disk.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use trajviz_core::ingest::resolve_conversations_dir;
use trajviz_core::pipeline::{self, BuildOptions};
use trajviz_core::{BuildResult, Config, ConversationSummary, ModelStatsEntry, SourceStatus};

#[derive(Parser)]
#[command(name = "trajviz-stats")]
#[command(about = "Show per-model statistics for recorded agent conversations")]
#[command(version)]
struct Args {
    /// Directory containing conversation data (default: ~/.openhands/conversations)
    conversations_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also list every conversation
    #[arg(short, long)]
    conversations: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    source: SourceStatus,
    models: &'a [ModelStatsEntry],
    conversations: Vec<ConversationSummary>,
    skipped: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        trajviz_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let input = args
        .conversations_dir
        .as_deref()
        .or(config.input.conversations_dir.as_deref());

    let options = BuildOptions {
        source: resolve_conversations_dir(input),
        timing: config.timing.clone(),
        parallel: config.build.parallel,
    };
    let result = pipeline::run(&options).context("failed to compute statistics")?;

    match args.format {
        Format::Json => print_json(&result)?,
        Format::Text => print_text(&result, args.conversations),
    }

    Ok(())
}

fn print_json(result: &BuildResult) -> Result<()> {
    let report = JsonReport {
        source: result.status(),
        models: &result.models,
        conversations: result.summaries(),
        skipped: result.skipped,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_text(result: &BuildResult, list_conversations: bool) {
    println!("Source: {}", result.source.path.display());

    if result.conversations.is_empty() {
        println!("No conversations found.");
        return;
    }

    println!();
    println!(
        "{:<32} {:>6} {:>10} {:>10} {:>12} {:>12}",
        "MODEL", "CONVS", "AVG TURN", "MAX TURN", "PROMPT", "COMPLETION"
    );
    for entry in &result.models {
        println!(
            "{:<32} {:>6} {:>9.1}s {:>9.1}s {:>12} {:>12}",
            truncate(&entry.model, 32),
            entry.conversations,
            entry.avg_turn_duration,
            entry.max_turn_duration,
            entry.total_prompt_tokens,
            entry.total_completion_tokens
        );
    }

    let unattributed = result
        .conversations
        .iter()
        .filter(|c| c.summary.model.is_none())
        .count();
    if unattributed > 0 {
        println!("({} conversation(s) without a model)", unattributed);
    }

    if list_conversations {
        println!();
        for conversation in &result.conversations {
            let s = &conversation.summary;
            println!(
                "{}  {:<24} {:>5} events  {:>7.1}s avg  {:>8.1}s total  {:>3.0}% cached",
                &s.id[..8.min(s.id.len())],
                truncate(s.model.as_deref().unwrap_or("-"), 24),
                s.event_count,
                s.avg_agent_turn_time,
                s.total_conversation_time,
                s.tokens.cache_pct * 100.0
            );
        }
    }

    println!();
    println!(
        "{} conversation(s), {} skipped",
        result.conversations.len(),
        result.skipped
    );
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}
