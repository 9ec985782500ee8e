use crate::error::SegmentResult;
use crate::filter::{Filter, FilterResult};
use crate::types::{EnrichedRecord, MemberQuery};

/// Restricts candidates to a single grade bucket.
pub struct GradeFilter;

impl Filter<MemberQuery, EnrichedRecord> for GradeFilter {
    fn enable(&self, query: &MemberQuery) -> bool {
        query.grade.is_some()
    }

    fn filter(
        &self,
        query: &MemberQuery,
        candidates: Vec<EnrichedRecord>,
    ) -> SegmentResult<FilterResult<EnrichedRecord>> {
        let Some(grade) = query.grade else {
            return Ok(FilterResult::pass_through(candidates));
        };
        let (kept, removed): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|c| c.grade == grade);

        Ok(FilterResult { kept, removed })
    }
}
