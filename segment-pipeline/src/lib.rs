//! Member segmentation pipeline.
//!
//! Loads a member transaction report, enriches every member with Grade,
//! Net Category, VIP, High Risk and High Withdraw, and answers the report
//! queries (totals, per-grade sums, top-N rankings, filtered subsets) over
//! the resulting in-memory table.
//!
//! ```text
//! CSV -> member_loader -> enrichment -> MemberTable -> filters / selector / totals
//! ```

pub mod components;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod filter;
pub mod member_loader;
pub mod pipelines;
pub mod selector;
pub mod table;
pub mod thresholds;
pub mod types;
pub mod util;

pub use config::{GradeBounds, NetBounds, SegmentationConfig, ZeroDepositPolicy};
pub use enrichment::enrich;
pub use error::{SegmentError, SegmentResult};
pub use table::{count_in_grade, filter_records, grade_buckets, MemberTable};
pub use types::{AmountField, EnrichedRecord, Grade, MemberQuery, NetCategory, RawRecord};
