use crate::{AggregateId, Position};

/// Filter for [`EventStore::query_events`](crate::EventStore::query_events).
///
/// Unset fields do not constrain the result. Matching events come back in
/// position order, after `offset` is skipped and `limit` applied.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub aggregate_id: Option<AggregateId>,

    pub aggregate_type: Option<String>,

    /// Any of these event types.
    pub event_types: Option<Vec<String>>,

    /// Inclusive lower bound on position.
    pub from_position: Option<Position>,

    /// Inclusive upper bound on position.
    pub to_position: Option<Position>,

    pub limit: Option<usize>,

    pub offset: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_aggregate(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id: Some(aggregate_id),
            ..Default::default()
        }
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types = Some(vec![event_type.into()]);
        self
    }

    pub fn event_types(mut self, event_types: Vec<String>) -> Self {
        self.event_types = Some(event_types);
        self
    }

    pub fn from_position(mut self, position: Position) -> Self {
        self.from_position = Some(position);
        self
    }

    pub fn to_position(mut self, position: Position) -> Self {
        self.to_position = Some(position);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the envelope satisfies every set filter.
    ///
    /// Limit and offset are applied by the store, not here.
    pub fn matches(&self, event: &crate::EventEnvelope) -> bool {
        if let Some(id) = self.aggregate_id
            && event.aggregate_id != id
        {
            return false;
        }
        if let Some(ref aggregate_type) = self.aggregate_type
            && &event.aggregate_type != aggregate_type
        {
            return false;
        }
        if let Some(ref types) = self.event_types
            && !types.contains(&event.event_type)
        {
            return false;
        }
        if let Some(from) = self.from_position
            && event.position < from
        {
            return false;
        }
        if let Some(to) = self.to_position
            && event.position > to
        {
            return false;
        }
        true
    }
}
