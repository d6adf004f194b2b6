//! Token usage aggregation.

use crate::types::{TokenStats, TokenUsage};

/// Derive totals and the cache ratio from raw counters.
///
/// `cache_pct` is `cache_read / prompt`, clamped to `[0, 1]`, and zero when no
/// prompt tokens were recorded.
pub fn aggregate_tokens(usage: &TokenUsage) -> TokenStats {
    let cache_pct = if usage.prompt_tokens > 0 {
        (usage.cache_read_tokens as f64 / usage.prompt_tokens as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    TokenStats {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        reasoning_tokens: usage.reasoning_tokens,
        cache_read_tokens: usage.cache_read_tokens,
        cache_pct,
        total_tokens: usage.prompt_tokens.saturating_add(usage.completion_tokens),
    }
}
