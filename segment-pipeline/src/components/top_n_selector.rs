use crate::selector::Selector;
use crate::types::{AmountField, EnrichedRecord};

/// Selects the top N members by one amount column.
pub struct TopNSelector {
    pub field: AmountField,
    pub n: usize,
}

impl TopNSelector {
    pub fn new(field: AmountField, n: usize) -> Self {
        Self { field, n }
    }
}

impl Selector<EnrichedRecord> for TopNSelector {
    fn score(&self, candidate: &EnrichedRecord) -> f64 {
        self.field.of(candidate)
    }

    fn size(&self) -> Option<usize> {
        Some(self.n)
    }
}
