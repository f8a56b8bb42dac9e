//! Bounded in-memory audit log of active-provider transitions.

use parking_lot::RwLock;
use relaymux_types::models::FailoverEvent;
use std::collections::VecDeque;

/// Oldest events are evicted past this many entries.
pub const MAX_FAILOVER_HISTORY: usize = 100;

/// Append-only FIFO of [`FailoverEvent`]s.
///
/// Has its own lock so audit reads never wait on health evaluation.
#[derive(Debug)]
pub struct FailoverHistory {
    events: RwLock<VecDeque<FailoverEvent>>,
    max_events: usize,
}

impl FailoverHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_FAILOVER_HISTORY)
    }

    /// Keeps at least one event.
    pub fn with_capacity(max_events: usize) -> Self {
        let max_events = max_events.max(1);
        Self { events: RwLock::new(VecDeque::with_capacity(max_events)), max_events }
    }

    pub fn record(&self, event: FailoverEvent) {
        let mut events = self.events.write();
        if events.len() >= self.max_events {
            let excess = events.len() - self.max_events + 1;
            events.drain(..excess);
        }
        events.push_back(event);
    }

    /// Copy of all events, oldest first.
    pub fn snapshot(&self) -> Vec<FailoverEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<FailoverEvent> {
        self.events.read().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl Default for FailoverHistory {
    fn default() -> Self {
        Self::new()
    }
}
