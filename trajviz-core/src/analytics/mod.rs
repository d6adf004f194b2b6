//! Analytics module for trajviz
//!
//! Derives every metric in the build from raw conversation records:
//! - [`timing`]: agent turn durations and total agent time per conversation
//! - [`tokens`]: derived token totals and cache ratio
//! - [`summary`]: one [`ConversationSummary`](crate::types::ConversationSummary) per conversation
//! - [`models`]: per-model rollups folded from the full summary set
//!
//! All functions here are pure. Nothing is cached between builds; every run
//! recomputes from the inputs.

pub mod models;
pub mod summary;
pub mod timing;
pub mod tokens;

pub use models::aggregate_models;
pub use summary::ConversationSummarizer;
pub use timing::{parse_timestamp, TimingEngine, TimingStats};
pub use tokens::aggregate_tokens;

/// Round seconds to one decimal place for display.
///
/// Exact halves round to the even tenth, so 1.25 becomes 1.2 and 0.75
/// becomes 0.8.
pub fn round_tenths(secs: f64) -> f64 {
    let scaled = secs * 10.0;
    let rounded = scaled.round();
    if (rounded - scaled).abs() == 0.5 {
        (scaled / 2.0).round() * 2.0 / 10.0
    } else {
        rounded / 10.0
    }
}
