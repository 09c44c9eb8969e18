use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventQuery, EventStoreError, Position, Result, Version,
    store::{AppendOptions, EventStore, EventStream, validate_events_for_append},
};

/// Event store that keeps the whole log in memory.
///
/// Events are held in append order, so the index of an event in the log is
/// its position minus one.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

fn stream_version(log: &[EventEnvelope], aggregate_id: AggregateId) -> Option<Version> {
    log.iter()
        .filter(|e| e.aggregate_id == aggregate_id)
        .map(|e| e.version)
        .max()
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let first_new_version = events[0].version;

        let mut log = self.events.write().await;
        let current_version = stream_version(&log, aggregate_id).unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Stream versions are unique even when no expectation was given.
        if first_new_version != current_version.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let mut position = Position::new(log.len() as u64);
        let mut last_version = current_version;
        let appended = events.len();
        for mut event in events {
            position = position.next();
            event.position = position;
            last_version = event.version;
            log.push(event);
        }

        tracing::debug!(
            %aggregate_id,
            version = %last_version,
            head = %position,
            "appended {appended} event(s)"
        );
        metrics::counter!("event_store_events_appended").increment(appended as u64);

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let log = self.events.read().await;
        let mut events: Vec<_> = log
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let log = self.events.read().await;
        let events = log
            .iter()
            .filter(|e| query.matches(e))
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(events)
    }

    async fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        self.query_events(EventQuery::new().event_type(event_type))
            .await
    }

    async fn stream_events_after(&self, after: Position) -> Result<EventStream> {
        let log = self.events.read().await;
        let start = usize::try_from(after.as_u64())
            .unwrap_or(usize::MAX)
            .min(log.len());
        let events: Vec<_> = log[start..].to_vec();
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let log = self.events.read().await;
        Ok(stream_version(&log, aggregate_id))
    }

    async fn head_position(&self) -> Result<Position> {
        Ok(Position::new(self.events.read().await.len() as u64))
    }
}
