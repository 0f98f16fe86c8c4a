//! Rolling log of lifecycle transitions.

use crate::event::EventState;
use camdeck_types::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default maximum transitions kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Requested directly (activate, complete, archive).
    Explicit,
    /// Completed because another event was force-activated.
    ForcedDisplacement,
}

/// A single recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub event_id: EventId,
    pub from: EventState,
    pub to: EventState,
    pub cause: TransitionCause,
    pub at: DateTime<Utc>,
}

/// Rolling buffer of recent transitions.
///
/// When full, the oldest entry is evicted on each append.
#[derive(Debug)]
pub struct TransitionLog {
    entries: VecDeque<Transition>,
    max_entries: usize,
}

impl TransitionLog {
    /// Creates a log with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Creates a log with the given capacity.
    ///
    /// A capacity of 0 is treated as 1.
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Appends a transition, evicting the oldest if at capacity.
    pub fn append(&mut self, transition: Transition) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(transition);
    }

    /// Returns the most recent `n` transitions (oldest first, newest last).
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<Transition> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Returns the most recent `n` transitions of one event (oldest first).
    #[must_use]
    pub fn for_event(&self, id: EventId, n: usize) -> Vec<Transition> {
        let mut found: Vec<_> = self
            .entries
            .iter()
            .rev()
            .filter(|t| t.event_id == id)
            .take(n)
            .cloned()
            .collect();
        found.reverse();
        found
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::new()
    }
}
