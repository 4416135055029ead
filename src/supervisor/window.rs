//! Restart-intensity limiting.
//!
//! A sliding window over the timestamps of the most recent restarts.
//! More than `max_restarts` restarts inside `max_seconds` means the
//! supervised subtree is failing persistently; the supervisor then gives
//! up and shuts itself down instead of looping.

// Layer 1: Standard library imports
use std::collections::VecDeque;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Duration, Utc};

// Layer 3: Internal module imports
// (none)

/// Sliding window of recent restart timestamps.
///
/// Holds at most `max_restarts` entries in monotone non-decreasing order.
/// An incoming restart is over budget when the window is already full and
/// the span from its oldest entry to the new event fits inside the
/// configured number of seconds.
#[derive(Debug, Clone)]
pub struct RestartWindow {
    limit: usize,
    span: Duration,
    events: VecDeque<DateTime<Utc>>,
}

impl RestartWindow {
    /// Window admitting `max_restarts` restarts per `max_seconds`.
    pub fn new(max_restarts: u32, max_seconds: f64) -> Self {
        Self {
            limit: max_restarts as usize,
            span: Duration::milliseconds((max_seconds * 1000.0).round() as i64),
            events: VecDeque::with_capacity(max_restarts as usize),
        }
    }

    /// Record a restart attempt at `at`.
    ///
    /// Returns `true` when the restart fits the budget, `false` when it
    /// exceeds it (the supervisor must shut down). The event is recorded
    /// either way and the window stays capped at `max_restarts` entries.
    pub fn note(&mut self, at: DateTime<Utc>) -> bool {
        let over = match self.events.front() {
            Some(first) if self.events.len() >= self.limit => {
                at.signed_duration_since(*first) <= self.span
            }
            _ => false,
        };

        if self.events.len() >= self.limit {
            self.events.pop_front();
        }
        self.events.push_back(at);

        !over
    }

    /// Number of recorded events (≤ `max_restarts`).
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no restart has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn events(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.events.iter()
    }
}
