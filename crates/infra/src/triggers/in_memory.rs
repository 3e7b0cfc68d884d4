use std::sync::{Arc, RwLock};

use hris_core::{Clock, SystemClock};
use hris_events::{NewTrigger, TriggerEvent};

use super::{TriggerStore, TriggerStoreError, newest_first};

/// In-memory append-only trigger log.
///
/// Intended for tests/dev and deployments without a configured log file.
pub struct InMemoryTriggerStore {
    events: RwLock<Vec<TriggerEvent>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTriggerStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every event in insertion order.
    pub fn all(&self) -> Vec<TriggerEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Default for InMemoryTriggerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryTriggerStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryTriggerStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TriggerStore for InMemoryTriggerStore {
    fn append(&self, trigger: NewTrigger) -> Result<TriggerEvent, TriggerStoreError> {
        let mut events = self.events.write().map_err(|_| TriggerStoreError::Poisoned)?;

        // Sequence and timestamp are taken under the write lock.
        let sequence = events.len() as u64 + 1;
        let event = TriggerEvent::commit(trigger, sequence, self.clock.now());
        events.push(event.clone());
        Ok(event)
    }

    fn recent(&self, limit: usize) -> Result<Vec<TriggerEvent>, TriggerStoreError> {
        let events = self.events.read().map_err(|_| TriggerStoreError::Poisoned)?;
        Ok(newest_first(&events, limit))
    }
}
