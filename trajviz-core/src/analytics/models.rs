//! Per-model rollups.
//!
//! A full fold over the summary set on every build. `avg_turn_duration` is the
//! mean of each conversation's own average turn time, so every conversation
//! weighs the same regardless of how many turns it had. `max_turn_duration` is
//! the largest of those per-conversation averages.

use crate::types::{ConversationSummary, ModelStatsEntry};
use std::collections::HashMap;

#[derive(Default)]
struct ModelAccumulator {
    conversations: usize,
    turn_time_sum: f64,
    turn_time_max: f64,
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Group summaries by model and roll each group up.
///
/// Conversations without a model are left out. Entries are sorted by
/// conversation count, descending; ties keep the order in which each model
/// first appears in `summaries`.
pub fn aggregate_models(summaries: &[ConversationSummary]) -> Vec<ModelStatsEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, ModelAccumulator> = HashMap::new();

    for summary in summaries {
        let Some(model) = summary.model.as_deref() else {
            continue;
        };

        let acc = groups.entry(model).or_insert_with(|| {
            order.push(model);
            ModelAccumulator::default()
        });
        acc.conversations += 1;
        acc.turn_time_sum += summary.avg_agent_turn_time;
        acc.turn_time_max = acc.turn_time_max.max(summary.avg_agent_turn_time);
        acc.prompt_tokens = acc.prompt_tokens.saturating_add(summary.tokens.prompt_tokens);
        acc.completion_tokens = acc
            .completion_tokens
            .saturating_add(summary.tokens.completion_tokens);
    }

    let mut entries: Vec<ModelStatsEntry> = order
        .into_iter()
        .filter_map(|model| {
            let acc = groups.remove(model)?;
            Some(ModelStatsEntry {
                model: model.to_string(),
                conversations: acc.conversations,
                avg_turn_duration: acc.turn_time_sum / acc.conversations as f64,
                max_turn_duration: acc.turn_time_max,
                total_prompt_tokens: acc.prompt_tokens,
                total_completion_tokens: acc.completion_tokens,
            })
        })
        .collect();

    // stable: ties keep first-seen order
    entries.sort_by(|a, b| b.conversations.cmp(&a.conversations));
    entries
}
