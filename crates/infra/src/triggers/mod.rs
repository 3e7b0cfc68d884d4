//! Append-only trigger log.
//!
//! Triggers are the only audit trail of detected risk conditions, so append
//! failures are always surfaced to the caller. Reads return the most recent
//! events by timestamp, newest first; events sharing a timestamp keep their
//! insertion order.

use std::sync::Arc;

use thiserror::Error;

use hris_events::{NewTrigger, TriggerEvent};

pub mod in_memory;
pub mod jsonl;
pub mod publishing;

pub use in_memory::InMemoryTriggerStore;
pub use jsonl::JsonlTriggerStore;
pub use publishing::PublishingTriggerStore;

/// Number of events returned when the caller does not specify a limit.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum TriggerStoreError {
    #[error("trigger log io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("trigger encoding failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("trigger log line {line} is corrupt: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("trigger store lock poisoned")]
    Poisoned,

    /// The event was appended but the notification could not be delivered.
    #[error("trigger {sequence} stored but not published: {reason}")]
    Publish { sequence: u64, reason: String },
}

pub trait TriggerStore: Send + Sync {
    /// Persist one trigger, assigning its sequence number and timestamp.
    fn append(&self, trigger: NewTrigger) -> Result<TriggerEvent, TriggerStoreError>;

    /// Up to `limit` events, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<TriggerEvent>, TriggerStoreError>;
}

impl<S> TriggerStore for Arc<S>
where
    S: TriggerStore + ?Sized,
{
    fn append(&self, trigger: NewTrigger) -> Result<TriggerEvent, TriggerStoreError> {
        (**self).append(trigger)
    }

    fn recent(&self, limit: usize) -> Result<Vec<TriggerEvent>, TriggerStoreError> {
        (**self).recent(limit)
    }
}

/// Select the newest `limit` events from an insertion-ordered log.
fn newest_first(log: &[TriggerEvent], limit: usize) -> Vec<TriggerEvent> {
    let mut order: Vec<&TriggerEvent> = log.iter().collect();
    // Stable: equal timestamps stay in insertion order.
    order.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    order.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hris_events::TriggerKind;

    fn event(sequence: u64, offset_secs: i64) -> TriggerEvent {
        let base = Utc.with_ymd_and_hms(2025, 9, 30, 9, 0, 0).unwrap();
        TriggerEvent::commit(
            NewTrigger::new(TriggerKind::HighAbsence, format!("event {sequence}")),
            sequence,
            base + Duration::seconds(offset_secs),
        )
    }

    #[test]
    fn newest_first_orders_by_timestamp_not_insertion() {
        let log = vec![event(1, 10), event(2, 30), event(3, 20)];
        let seqs: Vec<u64> = newest_first(&log, 10).iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![2, 3, 1]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let log = vec![event(1, 0), event(2, 5), event(3, 5), event(4, 5)];
        let seqs: Vec<u64> = newest_first(&log, 3).iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![2, 3, 4]);
    }

    #[test]
    fn limit_zero_is_empty() {
        assert!(newest_first(&[event(1, 0)], 0).is_empty());
    }
}
