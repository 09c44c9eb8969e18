//! Read model trait for query-side views.

/// A read model providing query access to denormalized data.
///
/// Read models are updated by projections and optimized for fast reads.
pub trait ReadModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of top-level entries, or 0 while a writer holds the lock.
    fn count(&self) -> usize;
}
