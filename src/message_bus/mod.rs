//! Internal pub/sub bus for permission-set lifecycle events.
//!
//! Two external interfaces of the engine are modeled as bus event streams:
//!
//! - the **change-capture stream**: the Metadata Store publishes a
//!   [`RecordChanged`] event carrying the old and new image on every
//!   mutation, for downstream consumers such as the provisioning process
//!   (nothing inside this crate consumes it);
//! - the **operator notification sink**: event-mode ingestion handlers
//!   publish [`IngestionFailure`] (and the delete path
//!   [`DependentLinksRemained`]) as fire-and-forget messages.
//!
//! The bus is a simple typed fan-out over `std::sync::mpsc`: subscribing
//! yields a [`Consumer`] for one event type, publishing delivers a clone of
//! the event to every live subscriber of that type. Publishing with no
//! subscribers succeeds, which is what makes the sink fire-and-forget.

pub mod events;
pub mod sync_bus;

pub use events::{DependentLinksRemained, EventType, IngestionFailure, RecordChanged};
pub use sync_bus::{Consumer, MessageBus, MessageBusError, MessageBusResult};
