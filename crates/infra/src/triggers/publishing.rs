use tracing::warn;

use hris_events::{EventBus, NewTrigger, TriggerEvent};

use super::{TriggerStore, TriggerStoreError};

/// Decorator that publishes every committed trigger to an [`EventBus`].
///
/// Publication happens only after the inner append succeeded. By default a
/// failed publish is logged and the append still counts as successful;
/// [`PublishingTriggerStore::require_delivery`] turns it into an error.
#[derive(Debug)]
pub struct PublishingTriggerStore<S, B> {
    inner: S,
    bus: B,
    require_delivery: bool,
}

impl<S, B> PublishingTriggerStore<S, B> {
    pub fn new(inner: S, bus: B) -> Self {
        Self {
            inner,
            bus,
            require_delivery: false,
        }
    }

    pub fn require_delivery(mut self) -> Self {
        self.require_delivery = true;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<S, B> TriggerStore for PublishingTriggerStore<S, B>
where
    S: TriggerStore,
    B: EventBus<TriggerEvent>,
{
    fn append(&self, trigger: NewTrigger) -> Result<TriggerEvent, TriggerStoreError> {
        let event = self.inner.append(trigger)?;

        if let Err(e) = self.bus.publish(event.clone()) {
            if self.require_delivery {
                return Err(TriggerStoreError::Publish {
                    sequence: event.sequence,
                    reason: format!("{e:?}"),
                });
            }
            warn!(sequence = event.sequence, error = ?e, "trigger notification not published");
        }

        Ok(event)
    }

    fn recent(&self, limit: usize) -> Result<Vec<TriggerEvent>, TriggerStoreError> {
        self.inner.recent(limit)
    }
}
