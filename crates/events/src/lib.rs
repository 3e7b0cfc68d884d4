//! Trigger events and the pub/sub mechanics used to fan them out.
//!
//! Triggers are the audit trail of detected risk conditions. They are persisted
//! by a trigger store first, then announced on an [`EventBus`] for live
//! consumers (SSE stream, diagnostics).

pub mod bus;
pub mod in_memory_bus;
pub mod trigger;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use trigger::{NewTrigger, TriggerEvent, TriggerKind};
