//! Projection processor for feeding events to projections.

use event_store::{EventEnvelope, EventStore, Position};
use futures_util::StreamExt;
use tokio::sync::{Mutex, MutexGuard};

use crate::Result;
use crate::projection::Projection;

/// What the processor does when a projection rejects an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop and return the error. The event is retried on the next catch-up.
    #[default]
    Halt,
    /// Log the error, mark the event consumed and keep going.
    Skip,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "halt" => Ok(FailurePolicy::Halt),
            "skip" => Ok(FailurePolicy::Skip),
            other => Err(format!("unknown failure policy `{other}` (expected halt or skip)")),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Halt => write!(f, "halt"),
            FailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Delivers events from an event store to registered projections.
///
/// The processor supports:
/// - Catch-up: streams everything past the slowest projection's position
/// - Single event delivery for events already appended to the store
/// - Rebuild: resets all projections and replays from scratch
///
/// Delivery is serialized, so projections always see one event at a time
/// in store order even when several callers trigger a catch-up at once.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Box<dyn Projection>>,
    failure_policy: FailurePolicy,
    delivery: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            failure_policy: FailurePolicy::default(),
            delivery: Mutex::new(()),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Position of the slowest registered projection, or `None` with none registered.
    pub async fn lowest_position(&self) -> Option<Position> {
        let mut lowest: Option<Position> = None;
        for projection in &self.projections {
            let pos = projection.position().await.last_position;
            lowest = Some(lowest.map_or(pos, |l| l.min(pos)));
        }
        lowest
    }

    /// Delivers every stored event each projection has not consumed yet.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<()> {
        let guard = self.delivery.lock().await;
        self.catch_up(&guard).await
    }

    /// Catch-up body; the caller must hold the delivery lock.
    async fn catch_up(&self, _delivery: &MutexGuard<'_, ()>) -> Result<()> {
        // Resume from the slowest projection.
        let Some(from) = self.lowest_position().await else {
            return Ok(());
        };

        let mut stream = self.store.stream_events_after(from).await?;
        let mut delivered: u64 = 0;

        while let Some(result) = stream.next().await {
            let event = result?;
            for projection in &self.projections {
                if !projection.position().await.has_seen(event.position) {
                    self.deliver(projection.as_ref(), &event).await?;
                    delivered += 1;
                }
            }
        }

        tracing::info!(events_delivered = delivered, from = %from, "catch-up complete");

        Ok(())
    }

    /// Delivers a single stored event to every projection that has not seen it.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type, position = %event.position))]
    pub async fn process_event(&self, event: &EventEnvelope) -> Result<()> {
        let _guard = self.delivery.lock().await;
        for projection in &self.projections {
            if !projection.position().await.has_seen(event.position) {
                self.deliver(projection.as_ref(), event).await?;
            }
        }
        Ok(())
    }

    /// Resets all projections and replays all events from the store.
    ///
    /// The delivery lock is held throughout, so a concurrent catch-up waits
    /// for the replay instead of returning while projections are empty.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        let guard = self.delivery.lock().await;
        for projection in &self.projections {
            projection.reset().await?;
        }
        self.catch_up(&guard).await
    }

    async fn deliver(&self, projection: &dyn Projection, event: &EventEnvelope) -> Result<()> {
        match projection.handle(event).await {
            Ok(()) => {
                metrics::counter!("projections_events_processed").increment(1);
                Ok(())
            }
            Err(err) => {
                metrics::counter!("projections_events_failed").increment(1);
                match self.failure_policy {
                    FailurePolicy::Halt => {
                        tracing::error!(
                            projection = projection.name(),
                            event_type = %event.event_type,
                            position = %event.position,
                            error = %err,
                            "projection halted"
                        );
                        Err(err)
                    }
                    FailurePolicy::Skip => {
                        tracing::warn!(
                            projection = projection.name(),
                            event_type = %event.event_type,
                            position = %event.position,
                            error = %err,
                            "skipping event rejected by projection"
                        );
                        projection.skip(event).await;
                        Ok(())
                    }
                }
            }
        }
    }
}
