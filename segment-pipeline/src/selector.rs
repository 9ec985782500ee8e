use std::cmp::Ordering;

use crate::util;

/// Selectors sort and truncate a candidate list.
pub trait Selector<C>: Send + Sync
where
    C: Clone + Send + Sync + 'static,
{
    /// Default selection: sort and truncate based on provided configs.
    fn select(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Extract the score from a candidate to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Sort candidates by score, highest first.
    ///
    /// Stable: members with equal scores stay in table order. NaN scores
    /// rank after every number.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| descending_nan_last(self.score(a), self.score(b)));
        sorted
    }

    /// Optionally provide a maximum number of candidates to select.
    /// Defaults to no truncation if not overridden.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Descending order on scores with every NaN placed last.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    a.is_nan()
        .cmp(&b.is_nan())
        .then_with(|| b.partial_cmp(&a).unwrap_or(Ordering::Equal))
}
