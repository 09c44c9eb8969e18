//! The trait tying domain events to event store envelopes.

use common::AggregateId;
use event_store::{EventEnvelope, Version};
use serde::{Serialize, de::DeserializeOwned};

use crate::DomainError;

/// Domain events are immutable facts, named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// The event name stored in [`EventEnvelope::event_type`].
    fn event_type(&self) -> &'static str;

    /// The kind of stream the event is appended to.
    fn aggregate_type(&self) -> &'static str;

    /// The stream the event is appended to.
    fn aggregate_id(&self) -> AggregateId;

    /// Wraps the event in an envelope carrying the given stream version.
    fn to_envelope(&self, version: Version) -> Result<EventEnvelope, DomainError> {
        Ok(EventEnvelope::builder()
            .event_type(self.event_type())
            .aggregate_type(self.aggregate_type())
            .aggregate_id(self.aggregate_id())
            .version(version)
            .payload(self)?
            .build()?)
    }

    /// Reads the event back out of an envelope payload.
    fn from_envelope(envelope: &EventEnvelope) -> Result<Self, DomainError> {
        Ok(serde_json::from_value(envelope.payload.clone())?)
    }
}
