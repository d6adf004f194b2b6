//! trajviz - build conversation summaries and model rollups
//!
//! Reads recorded agent conversations and writes the static data the
//! trajectory viewer loads.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/trajviz/trajviz.log (~/.local/state/trajviz/trajviz.log)
//! - Config: $XDG_CONFIG_HOME/trajviz/config.toml (~/.config/trajviz/config.toml)

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use trajviz_core::ingest::resolve_conversations_dir;
use trajviz_core::pipeline::{self, BuildOptions};
use trajviz_core::{ArtifactEmitter, BuildResult, Config};

#[derive(Parser, Debug)]
#[command(name = "trajviz")]
#[command(about = "Build trajectory data from recorded agent conversations")]
#[command(version)]
struct Args {
    /// Directory containing conversation data (default: ~/.openhands/conversations)
    conversations_dir: Option<PathBuf>,

    /// Output directory for the generated site data
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Process conversations one at a time
    #[arg(long)]
    sequential: bool,

    /// Verbose output (-v lists every diagnostic)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        trajviz_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("trajviz build starting");

    let input = args
        .conversations_dir
        .as_deref()
        .or(config.input.conversations_dir.as_deref());
    let source = resolve_conversations_dir(input);
    let output_dir = args.output_dir.unwrap_or_else(|| config.output.dir.clone());

    println!("Building trajectory data...");
    println!("   Source: {}", source.path.display());
    println!("   Output: {}", output_dir.display());
    println!("   Custom dir: {}", source.is_custom);

    let options = BuildOptions {
        source,
        timing: config.timing.clone(),
        parallel: config.build.parallel && !args.sequential,
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let result = pipeline::run_with_progress(&options, |total, dir| {
        pb.set_length(total as u64);
        pb.inc(1);
        pb.set_message(
            dir.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("...")
                .to_string(),
        );
    })
    .context("build failed")?;

    pb.finish_and_clear();

    let report = ArtifactEmitter::new(&output_dir)
        .emit(&result)
        .context("failed to write artifacts")?;

    print_build_result(&result, args.verbose);
    if !report.removed.is_empty() {
        println!("   Removed stale: {}", report.removed.len());
    }
    println!("   Data directory: {}", report.data_dir.display());

    tracing::info!(
        conversations = result.conversations.len(),
        skipped = result.skipped,
        "trajviz build complete"
    );

    Ok(())
}

fn print_build_result(result: &BuildResult, verbose: u8) {
    println!();
    println!("Build complete:");
    println!("   Conversations: {}", result.conversations.len());
    println!("   Skipped: {}", result.skipped);
    println!("   Events: {}", result.event_count());
    println!("   Models: {}", result.models.len());

    if !result.diagnostics.is_empty() {
        println!("   Warnings: {}", result.diagnostics.len());
        if verbose > 0 {
            for diagnostic in &result.diagnostics {
                println!("     - {}", diagnostic);
            }
        }
    }
}
