use crate::components::grade_filter::GradeFilter;
use crate::components::net_category_filter::NetCategoryFilter;
use crate::components::username_filter::UsernameFilter;
use crate::components::vip_filter::VipFilter;
use crate::error::SegmentResult;
use crate::filter::{Filter, FilterResult};
use crate::types::{EnrichedRecord, MemberQuery};

/// The member table search pipeline.
///
/// Pipeline flow:
/// 1. UsernameFilter keeps usernames matching the search pattern
/// 2. NetCategoryFilter keeps the selected net category
/// 3. VipFilter keeps VIP members when requested
/// 4. GradeFilter keeps a single grade bucket
///
/// Each stage only runs when the query enables it, so an empty query
/// returns every candidate. Kept records stay in input order.
pub struct MemberSearchPipeline {
    filters: Vec<Box<dyn Filter<MemberQuery, EnrichedRecord>>>,
}

impl MemberSearchPipeline {
    /// Pipeline with the standard member filters.
    pub fn new() -> Self {
        let filters: Vec<Box<dyn Filter<MemberQuery, EnrichedRecord>>> = vec![
            Box::new(UsernameFilter),
            Box::new(NetCategoryFilter),
            Box::new(VipFilter),
            Box::new(GradeFilter),
        ];
        Self { filters }
    }

    /// Pipeline with a custom filter chain.
    pub fn with_filters(filters: Vec<Box<dyn Filter<MemberQuery, EnrichedRecord>>>) -> Self {
        Self { filters }
    }

    pub fn filters(&self) -> &[Box<dyn Filter<MemberQuery, EnrichedRecord>>] {
        &self.filters
    }

    /// Run every enabled filter in order over `candidates`.
    ///
    /// The first failing filter aborts the search; the caller's data is
    /// not affected since candidates are passed by value.
    pub fn execute(
        &self,
        query: &MemberQuery,
        candidates: Vec<EnrichedRecord>,
    ) -> SegmentResult<FilterResult<EnrichedRecord>> {
        let mut kept = candidates;
        let mut removed = Vec::new();

        for filter in self.filters.iter().filter(|f| f.enable(query)) {
            let before = kept.len();
            let result = filter.filter(query, kept)?;
            log::debug!(
                "filter={} kept={} removed={}",
                filter.name(),
                result.kept.len(),
                before - result.kept.len()
            );
            kept = result.kept;
            removed.extend(result.removed);
        }

        Ok(FilterResult { kept, removed })
    }
}

impl Default for MemberSearchPipeline {
    fn default() -> Self {
        Self::new()
    }
}
