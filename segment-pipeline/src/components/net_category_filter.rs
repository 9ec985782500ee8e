use crate::error::SegmentResult;
use crate::filter::{Filter, FilterResult};
use crate::types::{EnrichedRecord, MemberQuery};

/// Keeps members in the requested net category. A query without a
/// category ("all") leaves the filter disabled.
pub struct NetCategoryFilter;

impl Filter<MemberQuery, EnrichedRecord> for NetCategoryFilter {
    fn enable(&self, query: &MemberQuery) -> bool {
        query.net_category.is_some()
    }

    fn filter(
        &self,
        query: &MemberQuery,
        candidates: Vec<EnrichedRecord>,
    ) -> SegmentResult<FilterResult<EnrichedRecord>> {
        let Some(category) = query.net_category else {
            return Ok(FilterResult::pass_through(candidates));
        };
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| c.net_category == category);

        Ok(FilterResult { kept, removed })
    }
}
