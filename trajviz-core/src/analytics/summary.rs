//! Per-conversation summaries.

use super::timing::TimingEngine;
use super::tokens::aggregate_tokens;
use super::round_tenths;
use crate::config::TimingConfig;
use crate::types::{BaseState, ConversationSummary, RawEvent};
use chrono::{DateTime, Utc};

/// Builds one [`ConversationSummary`] per conversation.
pub struct ConversationSummarizer<'a> {
    timing: TimingEngine<'a>,
}

impl<'a> ConversationSummarizer<'a> {
    pub fn new(policy: &'a TimingConfig) -> Self {
        Self {
            timing: TimingEngine::new(policy),
        }
    }

    /// Summarize a conversation.
    ///
    /// `events` are the events that parsed; `event_count` is the number of event
    /// files on disk, so events that failed to parse still count toward it.
    /// Events are ordered by their raw timestamp before timing; ties keep file
    /// order.
    pub fn summarize(
        &self,
        id: &str,
        created: DateTime<Utc>,
        base: &BaseState,
        events: &[RawEvent],
        event_count: usize,
    ) -> ConversationSummary {
        let mut ordered: Vec<&RawEvent> = events.iter().collect();
        ordered.sort_by(|a, b| {
            a.timestamp
                .as_deref()
                .unwrap_or("")
                .cmp(b.timestamp.as_deref().unwrap_or(""))
        });

        let timing = self.timing.compute(ordered);
        let tokens = aggregate_tokens(&base.usage);

        ConversationSummary {
            id: id.to_string(),
            title: base.title.clone().unwrap_or_else(|| id.to_string()),
            model: base.model.clone(),
            created,
            event_count,
            tokens,
            avg_agent_turn_time: round_tenths(timing.avg_agent_turn_time),
            total_conversation_time: round_tenths(timing.total_conversation_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn base(model: Option<&str>) -> BaseState {
        let mut agent = json!({"id": "refactor-parser"});
        if let Some(model) = model {
            agent["llm"] = json!({"model": model});
        }
        BaseState::from_value(json!({
            "agent": agent,
            "stats": {"usage_to_metrics": {"agent": {"accumulated_token_usage": {
                "prompt_tokens": 200,
                "completion_tokens": 50,
                "cache_read_tokens": 50
            }}}}
        }))
        .unwrap()
    }

    fn ev(source: &str, timestamp: &str) -> RawEvent {
        RawEvent {
            source: source.to_string(),
            timestamp: Some(timestamp.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_combines_timing_tokens_and_metadata() {
        let policy = TimingConfig::default();
        let events = vec![
            ev("user", "2025-06-01T10:00:00Z"),
            ev("agent", "2025-06-01T10:00:03Z"),
            ev("agent", "2025-06-01T10:00:08Z"),
        ];
        let summary =
            ConversationSummarizer::new(&policy).summarize(ID, Utc::now(), &base(Some("gpt-5")), &events, 3);

        assert_eq!(summary.id, ID);
        assert_eq!(summary.title, "refactor-parser");
        assert_eq!(summary.model.as_deref(), Some("gpt-5"));
        assert_eq!(summary.event_count, 3);
        assert_eq!(summary.tokens.total_tokens, 250);
        assert!((summary.tokens.cache_pct - 0.25).abs() < 1e-9);
        assert_eq!(summary.avg_agent_turn_time, 4.0);
        assert_eq!(summary.total_conversation_time, 5.0);
    }

    #[test]
    fn test_event_count_includes_unparsed_files() {
        let policy = TimingConfig::default();
        let events = vec![ev("agent", "2025-06-01T10:00:00Z")];
        let summary =
            ConversationSummarizer::new(&policy).summarize(ID, Utc::now(), &base(None), &events, 4);

        assert_eq!(summary.event_count, 4);
        assert!(summary.model.is_none());
        assert_eq!(summary.avg_agent_turn_time, 0.0);
        assert_eq!(summary.total_conversation_time, 0.0);
    }

    #[test]
    fn test_events_are_ordered_by_timestamp() {
        let policy = TimingConfig::default();
        let events = vec![
            ev("agent", "2025-06-01T10:00:06Z"),
            ev("user", "2025-06-01T10:00:00Z"),
        ];
        let summary =
            ConversationSummarizer::new(&policy).summarize(ID, Utc::now(), &base(None), &events, 2);

        assert_eq!(summary.avg_agent_turn_time, 6.0);
    }

    #[test]
    fn test_average_rounds_half_to_even() {
        let policy = TimingConfig::default();
        let events = vec![
            ev("user", "2025-06-01T10:00:00Z"),
            ev("agent", "2025-06-01T10:00:01Z"),
            ev("user", "2025-06-01T10:00:10Z"),
            ev("agent", "2025-06-01T10:00:11.5Z"),
        ];
        let summary =
            ConversationSummarizer::new(&policy).summarize(ID, Utc::now(), &base(None), &events, 4);

        // turns of 1.0 s and 1.5 s
        assert_eq!(summary.avg_agent_turn_time, 1.2);
        assert_eq!(summary.total_conversation_time, 9.0);
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let policy = TimingConfig::default();
        let state = BaseState::from_value(json!({})).unwrap();
        let summary = ConversationSummarizer::new(&policy).summarize(ID, Utc::now(), &state, &[], 0);
        assert_eq!(summary.title, ID);
    }
}
