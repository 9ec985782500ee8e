//! The in-memory member table and its report queries.
//!
//! A table is built once per ingested report and never mutated; every
//! query below reads it and returns fresh values.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::components::top_n_selector::TopNSelector;
use crate::config::SegmentationConfig;
use crate::enrichment;
use crate::error::{SegmentError, SegmentResult};
use crate::member_loader;
use crate::pipelines::member_search::MemberSearchPipeline;
use crate::selector::Selector;
use crate::types::{AmountField, EnrichedRecord, Grade, MemberQuery, NetCategory, RawRecord};

/// Headline numbers for a table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableSummary {
    pub members: usize,
    pub total_deposit: f64,
    pub total_withdraw: f64,
    pub total_profit: f64,
    pub vip_members: usize,
    pub high_risk_members: usize,
    pub high_withdraw_members: usize,
}

/// Per-grade totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradeTotals {
    pub grade: Grade,
    pub members: usize,
    pub deposit: f64,
    pub withdraw: f64,
    pub profit: f64,
}

/// Members of one grade, possibly none.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradeBucket {
    pub grade: Grade,
    pub count: usize,
    pub members: Vec<EnrichedRecord>,
}

#[derive(Clone, Debug, Default)]
pub struct MemberTable {
    records: Vec<EnrichedRecord>,
}

impl MemberTable {
    /// Wrap already-enriched records.
    pub fn new(records: Vec<EnrichedRecord>) -> Self {
        Self { records }
    }

    /// Enrich raw rows into a table.
    pub fn from_raw(rows: Vec<RawRecord>, config: &SegmentationConfig) -> SegmentResult<Self> {
        config.validate()?;
        Ok(Self::new(enrichment::enrich(rows, config)?))
    }

    /// Load and enrich a CSV report.
    pub fn ingest<R: Read>(reader: R, config: &SegmentationConfig) -> SegmentResult<Self> {
        let rows = member_loader::load_members(reader)?;
        Self::from_raw(rows, config)
    }

    /// Load and enrich a CSV report file.
    pub fn ingest_file(
        path: impl AsRef<Path>,
        config: &SegmentationConfig,
    ) -> SegmentResult<Self> {
        let rows = member_loader::load_members_file(path)?;
        Self::from_raw(rows, config)
    }

    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EnrichedRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail with `EmptyInput` when no member survived enrichment.
    pub fn ensure_non_empty(self) -> SegmentResult<Self> {
        if self.records.is_empty() {
            Err(SegmentError::EmptyInput)
        } else {
            Ok(self)
        }
    }

    /// Sum of one column over every member.
    pub fn total_by(&self, field: AmountField) -> f64 {
        self.records.iter().fold(0.0, |acc, r| acc + field.of(r))
    }

    /// Sum of one column per grade. Grades with no members are absent.
    pub fn sum_by_grade(&self, field: AmountField) -> BTreeMap<Grade, f64> {
        let mut sums: BTreeMap<Grade, f64> = BTreeMap::new();
        for record in &self.records {
            *sums.entry(record.grade).or_insert(0.0) += field.of(record);
        }
        sums
    }

    /// The `n` members with the largest value in `field`, ties in table order.
    pub fn top_n(&self, field: AmountField, n: usize) -> Vec<EnrichedRecord> {
        TopNSelector::new(field, n).select(self.records.clone())
    }

    /// Members matching every criterion in `query`, in table order.
    pub fn filter(&self, query: &MemberQuery) -> SegmentResult<Vec<EnrichedRecord>> {
        filter_records(self.records.clone(), query)
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            members: self.records.len(),
            total_deposit: self.total_by(AmountField::Deposit),
            total_withdraw: self.total_by(AmountField::Withdraw),
            total_profit: self.total_by(AmountField::Profit),
            vip_members: self.records.iter().filter(|r| r.vip).count(),
            high_risk_members: self.records.iter().filter(|r| r.high_risk).count(),
            high_withdraw_members: self.records.iter().filter(|r| r.high_withdraw).count(),
        }
    }

    /// Counts and sums for each grade present, best tier first.
    pub fn grade_breakdown(&self) -> Vec<GradeTotals> {
        let mut groups: BTreeMap<Grade, Vec<&EnrichedRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.grade).or_default().push(record);
        }
        groups
            .into_iter()
            .map(|(grade, members)| GradeTotals {
                grade,
                members: members.len(),
                deposit: members.iter().map(|r| r.deposit_amount).sum(),
                withdraw: members.iter().map(|r| r.withdraw_amount).sum(),
                profit: members.iter().map(|r| r.profit).sum(),
            })
            .collect()
    }

    /// Distinct grades present, best tier first.
    pub fn grades(&self) -> Vec<Grade> {
        self.sum_by_grade(AmountField::Profit).into_keys().collect()
    }

    /// Distinct net categories present, in first-seen order.
    pub fn net_categories(&self) -> Vec<NetCategory> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.net_category) {
                seen.push(record.net_category);
            }
        }
        seen
    }
}

/// Apply `query` to any sequence of members.
pub fn filter_records(
    records: Vec<EnrichedRecord>,
    query: &MemberQuery,
) -> SegmentResult<Vec<EnrichedRecord>> {
    let result = MemberSearchPipeline::new().execute(query, records)?;
    Ok(result.kept)
}

/// Number of members in `records` with the given grade.
pub fn count_in_grade(records: &[EnrichedRecord], grade: Grade) -> usize {
    records.iter().filter(|r| r.grade == grade).count()
}

/// Split `records` into all five grade buckets, best tier first.
pub fn grade_buckets(records: &[EnrichedRecord]) -> Vec<GradeBucket> {
    Grade::ALL
        .iter()
        .map(|&grade| {
            let members: Vec<EnrichedRecord> = records
                .iter()
                .filter(|r| r.grade == grade)
                .cloned()
                .collect();
            GradeBucket {
                grade,
                count: members.len(),
                members,
            }
        })
        .collect()
}
