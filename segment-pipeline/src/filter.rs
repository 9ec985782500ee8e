use crate::error::SegmentResult;
use crate::util;

/// Result of a filter operation, partitioning candidates into kept and removed.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

impl<C> FilterResult<C> {
    /// Everything kept, nothing removed.
    pub fn pass_through(candidates: Vec<C>) -> Self {
        Self {
            kept: candidates,
            removed: Vec::new(),
        }
    }
}

/// Filters run sequentially and partition candidates into kept and removed sets.
pub trait Filter<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this filter should run for the given query.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Filter candidates by evaluating each against some criteria.
    /// Returns a FilterResult containing kept candidates (which continue
    /// to the next stage) and removed candidates (which are excluded
    /// from further processing). Relative order is preserved in both.
    fn filter(&self, query: &Q, candidates: Vec<C>) -> SegmentResult<FilterResult<C>>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
