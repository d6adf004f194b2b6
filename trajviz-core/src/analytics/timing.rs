//! Turn timing for a single conversation.
//!
//! Walks consecutive event pairs in order. Each pair with two parseable
//! timestamps and a positive gap is an interval:
//!
//! - the interval is a **turn** when the later event comes from a
//!   turn-closing source (the agent, by default);
//! - the interval is **user wait** when the earlier event comes from a wait
//!   source (the user, by default) and is left out of the total.
//!
//! An event with a missing or unparseable timestamp breaks the chain: neither
//! interval touching it is measured, so it never shows up as a zero-length
//! turn in the average.

use crate::config::TimingConfig;
use crate::types::RawEvent;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Timing figures for one conversation, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimingStats {
    /// Number of measured turns
    pub turn_count: usize,
    /// Mean turn duration, zero when there are no turns
    pub avg_agent_turn_time: f64,
    /// Sum of all measured intervals except user waits
    pub total_conversation_time: f64,
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset or `Z`, and naive timestamps (with `T` or
/// a space separator) which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Gap length in seconds, kept to microsecond precision.
fn gap_secs(gap: Duration) -> f64 {
    match gap.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        // only overflows for gaps of ~290k years
        None => gap.num_milliseconds() as f64 / 1000.0,
    }
}

/// Computes [`TimingStats`] under a turn boundary policy.
pub struct TimingEngine<'a> {
    policy: &'a TimingConfig,
}

impl<'a> TimingEngine<'a> {
    pub fn new(policy: &'a TimingConfig) -> Self {
        Self { policy }
    }

    /// Compute timing for events already in chronological order.
    pub fn compute<'e, I>(&self, events: I) -> TimingStats
    where
        I: IntoIterator<Item = &'e RawEvent>,
    {
        let stamped: Vec<(&RawEvent, Option<DateTime<Utc>>)> = events
            .into_iter()
            .map(|e| (e, e.timestamp.as_deref().and_then(parse_timestamp)))
            .collect();

        let mut turns: Vec<f64> = Vec::new();
        let mut total = 0.0;

        for pair in stamped.windows(2) {
            let ((prev, start), (curr, end)) = (pair[0], pair[1]);
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };

            let secs = gap_secs(end.signed_duration_since(start));
            if secs <= 0.0 {
                continue;
            }

            if !self.policy.is_wait_source(&prev.source) {
                total += secs;
            }
            if self.policy.closes_turn(&curr.source) {
                turns.push(secs);
            }
        }

        let avg = if turns.is_empty() {
            0.0
        } else {
            turns.iter().sum::<f64>() / turns.len() as f64
        };

        TimingStats {
            turn_count: turns.len(),
            avg_agent_turn_time: avg,
            total_conversation_time: total,
        }
    }
}
