//! # trajviz-core
//!
//! Core library for trajviz - metrics and normalization for recorded agent
//! conversations.
//!
//! This library provides:
//! - Domain types for raw events, normalized events, and summaries
//! - Conversation discovery and loading
//! - Event normalization into a single display payload
//! - Turn timing, token, and per-model analytics
//! - Artifact emission for the static viewer
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Layer 0 (Raw):** `base_state.json` and `events/event-*.json` on disk (immutable)
//! - **Layer 1 (Canonical):** [`NormalizedEvent`] records with a resolved [`DisplayPayload`]
//! - **Layer 2 (Derived):** [`ConversationSummary`] and [`ModelStatsEntry`] (recomputed every build)
//!
//! ## Example
//!
//! ```rust,no_run
//! use trajviz_core::ingest::resolve_conversations_dir;
//! use trajviz_core::pipeline::{self, BuildOptions};
//! use trajviz_core::{ArtifactEmitter, Config};
//!
//! let config = Config::load().expect("failed to load config");
//! let options = BuildOptions {
//!     source: resolve_conversations_dir(None),
//!     timing: config.timing.clone(),
//!     parallel: config.build.parallel,
//! };
//!
//! let result = pipeline::run(&options).expect("build failed");
//! ArtifactEmitter::new(&config.output.dir)
//!     .emit(&result)
//!     .expect("failed to write artifacts");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use emit::ArtifactEmitter;
pub use error::{Error, Result};
pub use pipeline::{BuildOptions, BuildResult};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod emit;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod types;
