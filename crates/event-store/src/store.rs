use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, EventQuery, EventStoreError, Position, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected stream version before the append. `None` skips the check.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// No version check.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// The stream must not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// A stream of stored events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEnvelope>> + Send>>;

/// Core trait for event store implementations.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends a batch of events for a single stream.
    ///
    /// The batch is atomic. Each stored event is stamped with the next
    /// store-wide [`Position`]. Returns the stream version after the append.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// All events of one stream, oldest first.
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>>;

    /// Streams every stored event in position order.
    async fn stream_all_events(&self) -> Result<EventStream> {
        self.stream_events_after(Position::start()).await
    }

    /// Streams events whose position is strictly greater than `after`.
    async fn stream_events_after(&self, after: Position) -> Result<EventStream>;

    /// Current version of a stream, or `None` if it has no events.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;

    /// Position of the most recently appended event.
    async fn head_position(&self) -> Result<Position>;
}

/// Convenience methods available on every [`EventStore`].
#[async_trait]
pub trait EventStoreExt: EventStore {
    async fn append_event(&self, event: EventEnvelope, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    async fn aggregate_exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.get_aggregate_version(aggregate_id).await?.is_some())
    }

    /// Version the next event appended to the stream should carry.
    async fn next_version(&self, aggregate_id: AggregateId) -> Result<Version> {
        Ok(self
            .get_aggregate_version(aggregate_id)
            .await?
            .unwrap_or_else(Version::initial)
            .next())
    }
}

impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks that a batch is non-empty, targets one stream and has sequential versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "cannot append an empty batch".to_string(),
        ));
    };

    let mut expected_version = first.version;
    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidAppend(
                "all events must belong to the same aggregate".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidAppend(
                "all events must have the same aggregate type".to_string(),
            ));
        }
        expected_version = expected_version.next();
        if event.version != expected_version {
            return Err(EventStoreError::InvalidAppend(format!(
                "versions must be sequential: expected {}, got {}",
                expected_version, event.version
            )));
        }
    }

    Ok(())
}
