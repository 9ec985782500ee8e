use regex::{Regex, RegexBuilder};

use crate::error::{SegmentError, SegmentResult};
use crate::filter::{Filter, FilterResult};
use crate::types::{EnrichedRecord, MemberQuery};

/// Case-insensitive username search.
///
/// The pattern is a regex matched anywhere in the username, or plain text
/// when the query sets `literal`. An empty pattern disables the filter.
pub struct UsernameFilter;

impl UsernameFilter {
    /// Build the matcher for a query's pattern.
    pub fn compile(query: &MemberQuery) -> SegmentResult<Regex> {
        let pattern = if query.literal {
            regex::escape(&query.username_pattern)
        } else {
            query.username_pattern.clone()
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| SegmentError::InvalidPattern {
                pattern: query.username_pattern.clone(),
                source,
            })
    }
}

impl Filter<MemberQuery, EnrichedRecord> for UsernameFilter {
    fn enable(&self, query: &MemberQuery) -> bool {
        !query.username_pattern.is_empty()
    }

    fn filter(
        &self,
        query: &MemberQuery,
        candidates: Vec<EnrichedRecord>,
    ) -> SegmentResult<FilterResult<EnrichedRecord>> {
        let matcher = Self::compile(query)?;
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| matcher.is_match(&c.username));

        Ok(FilterResult { kept, removed })
    }
}
