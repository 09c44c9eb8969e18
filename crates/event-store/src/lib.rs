//! Append-only event log.
//!
//! Events are wrapped in [`EventEnvelope`]s, grouped into per-aggregate
//! streams guarded by optimistic [`Version`] checks, and stamped with a
//! store-wide [`Position`] that fixes the order in which projections see them.

pub mod error;
pub mod event;
pub mod memory;
pub mod query;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Position, Version};
pub use memory::InMemoryEventStore;
pub use query::EventQuery;
pub use store::{AppendOptions, EventStore, EventStoreExt, EventStream};
