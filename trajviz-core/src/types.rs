//! Core domain types for trajviz
//!
//! These types model one build pass over a directory of recorded agent
//! conversations, from raw on-disk records to the values the artifact
//! emitter serializes.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Conversation** | One recorded agent session: a base state plus an ordered event sequence |
//! | **Event** | One agent, user, system or error action recorded as its own file |
//! | **Turn** | An interval of active agent work between two events |
//! | **User wait** | Time spent waiting on user input; excluded from conversation totals |
//! | **Model rollup** | Statistics across every conversation that used one model |
//!
//! Every value here is produced once and never mutated afterwards. Derived
//! numbers (cache ratio, totals, averages) are computed by the analytics
//! module when the owning record is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

// ============================================
// Raw records (Layer 0)
// ============================================

/// One event file as recorded by the agent framework.
///
/// The payload is a loose union: exactly one of the optional payload fields is
/// normally populated, depending on what kind of action the event records.
/// [`crate::normalize::normalize_event`] resolves it into a [`DisplayPayload`].
///
/// Metadata fields accept any JSON scalar: numbers and booleans are kept as
/// their text, while `null`, arrays and objects read as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// `system`, `user`, `agent`, `error`, or any other producer name
    #[serde(deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(deserialize_with = "lenient_opt_string")]
    pub kind: Option<String>,
    /// ISO-8601; may be missing or malformed
    #[serde(deserialize_with = "lenient_opt_string")]
    pub timestamp: Option<String>,
    pub thought: Option<Value>,
    pub action: Option<Value>,
    pub observation: Option<Value>,
    pub content: Option<Value>,
    pub system_prompt: Option<Value>,
    pub error: Option<Value>,
    pub duration: Option<Value>,
    pub model: Option<Value>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Raw token counters from a conversation's base state.
///
/// Missing counters default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub reasoning_tokens: u64,
    pub cache_read_tokens: u64,
}

/// The per-conversation base-state record.
///
/// Keeps the untouched JSON for the detail artifact alongside the handful of
/// fields the metrics need.
#[derive(Debug, Clone)]
pub struct BaseState {
    /// `agent.id`
    pub title: Option<String>,
    /// `agent.llm.model`
    pub model: Option<String>,
    /// `stats.usage_to_metrics.agent.accumulated_token_usage`
    pub usage: TokenUsage,
    pub raw: Value,
}

impl BaseState {
    /// Extract the metric fields from a parsed base-state document.
    ///
    /// Any field that is missing or has the wrong shape falls back to its
    /// default; only a non-object document is rejected.
    pub fn from_value(raw: Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }

        let title = raw
            .pointer("/agent/id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let model = raw
            .pointer("/agent/llm/model")
            .and_then(Value::as_str)
            .map(str::to_string);

        let usage = raw
            .pointer("/stats/usage_to_metrics/agent/accumulated_token_usage")
            .map(|u| {
                let counter = |key: &str| u.get(key).and_then(Value::as_u64).unwrap_or(0);
                TokenUsage {
                    prompt_tokens: counter("prompt_tokens"),
                    completion_tokens: counter("completion_tokens"),
                    reasoning_tokens: counter("reasoning_tokens"),
                    cache_read_tokens: counter("cache_read_tokens"),
                }
            })
            .unwrap_or_default();

        Some(Self {
            title,
            model,
            usage,
            raw,
        })
    }
}

// ============================================
// Normalized events (Layer 1)
// ============================================

/// The single display payload resolved from a [`RawEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum DisplayPayload {
    Thought(String),
    Action(String),
    Observation(String),
    Content(String),
    Error(String),
    #[default]
    None,
}

impl DisplayPayload {
    /// Tag name as it appears in the artifacts, `None` for an empty payload
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            DisplayPayload::Thought(_) => Some("thought"),
            DisplayPayload::Action(_) => Some("action"),
            DisplayPayload::Observation(_) => Some("observation"),
            DisplayPayload::Content(_) => Some("content"),
            DisplayPayload::Error(_) => Some("error"),
            DisplayPayload::None => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DisplayPayload::Thought(text)
            | DisplayPayload::Action(text)
            | DisplayPayload::Observation(text)
            | DisplayPayload::Content(text)
            | DisplayPayload::Error(text) => text,
            DisplayPayload::None => "",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DisplayPayload::None)
    }
}

/// Canonical event record served to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub id: String,
    pub source: String,
    pub kind: Option<String>,
    pub timestamp: Option<String>,
    /// Seconds, when the raw event recorded a numeric duration
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "DisplayPayload::is_none")]
    pub display_payload: DisplayPayload,
}

// ============================================
// Summaries (Layer 2)
// ============================================

/// Token counters plus the values derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub reasoning_tokens: u64,
    pub cache_read_tokens: u64,
    /// Fraction of prompt tokens served from cache, in `[0, 1]`
    pub cache_pct: f64,
    /// `prompt_tokens + completion_tokens`
    pub total_tokens: u64,
}

/// One row of the conversation index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub model: Option<String>,
    pub created: DateTime<Utc>,
    /// Number of event files, including ones that failed to parse
    pub event_count: usize,
    #[serde(flatten)]
    pub tokens: TokenStats,
    /// Seconds
    pub avg_agent_turn_time: f64,
    /// Seconds of agent work, user waits excluded
    pub total_conversation_time: f64,
}

/// Rollup of every conversation that used one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatsEntry {
    pub model: String,
    pub conversations: usize,
    /// Mean of the member conversations' average turn times
    pub avg_turn_duration: f64,
    /// Largest member average turn time
    pub max_turn_duration: f64,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
}

/// Per-conversation detail artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryDetail {
    pub id: String,
    pub created: DateTime<Utc>,
    pub event_count: usize,
    pub model: Option<String>,
    pub base_state: Value,
}

/// Whether the build read the default conversations directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub static_mode: bool,
    pub is_custom_dir: bool,
    pub directory_name: String,
}

// ============================================
// Diagnostics
// ============================================

/// What a non-fatal diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The conversations directory does not exist
    MissingInput,
    /// Base state missing or unparseable; conversation left out
    ConversationSkipped,
    /// Event file unreadable; event left out
    EventSkipped,
}

/// A skip or default decision surfaced to the caller instead of failing.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub conversation_id: Option<String>,
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.conversation_id {
            Some(id) => write!(f, "[{}] {}: {}", id, self.path.display(), self.message),
            None => write!(f, "{}: {}", self.path.display(), self.message),
        }
    }
}
