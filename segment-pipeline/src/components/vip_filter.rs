use crate::error::SegmentResult;
use crate::filter::{Filter, FilterResult};
use crate::types::{EnrichedRecord, MemberQuery};

/// Keeps only VIP members when the query asks for them.
pub struct VipFilter;

impl Filter<MemberQuery, EnrichedRecord> for VipFilter {
    fn enable(&self, query: &MemberQuery) -> bool {
        query.vip_only
    }

    fn filter(
        &self,
        _query: &MemberQuery,
        candidates: Vec<EnrichedRecord>,
    ) -> SegmentResult<FilterResult<EnrichedRecord>> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| c.vip);

        Ok(FilterResult { kept, removed })
    }
}
