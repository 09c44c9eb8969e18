//! Core projection trait and position tracking.

use async_trait::async_trait;
use event_store::{EventEnvelope, Position};

use crate::Result;

/// How far a projection has read into the event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    /// Store position of the last event consumed.
    pub last_position: Position,

    /// Number of events consumed, applied or ignored.
    pub events_processed: u64,
}

impl ProjectionPosition {
    /// A projection that has seen nothing.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Records that the event at `position` has been consumed.
    ///
    /// Envelopes that were never stored keep the last position unchanged.
    pub fn advance_to(&self, position: Position) -> Self {
        Self {
            last_position: self.last_position.max(position),
            events_processed: self.events_processed + 1,
        }
    }

    /// Returns true if the stored event at `position` was already consumed.
    pub fn has_seen(&self, position: Position) -> bool {
        position > Position::start() && position <= self.last_position
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.last_position)
    }
}

/// A projection that folds stored events into a read model.
///
/// Implementations must ignore event types they do not understand; the log
/// is shared with unrelated consumers.
#[async_trait]
pub trait Projection: Send + Sync {
    fn name(&self) -> &'static str;

    /// Applies one event and records it as consumed.
    ///
    /// On error the position must not move, so a later catch-up retries the event.
    async fn handle(&self, event: &EventEnvelope) -> Result<()>;

    /// Records an event as consumed without applying it.
    async fn skip(&self, event: &EventEnvelope);

    async fn position(&self) -> ProjectionPosition;

    /// Clears the read model and rewinds to the start of the log.
    async fn reset(&self) -> Result<()>;
}
