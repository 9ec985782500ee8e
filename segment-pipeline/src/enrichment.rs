//! Member enrichment from raw report rows.
//!
//! Turns each retained `RawRecord` into an `EnrichedRecord`:
//! - Net amount: deposit - withdraw (profit is the same value)
//! - Grade: priority chain on deposit (AAA > A > B > C > D)
//! - Net category: High Surplus / Surplus / Balanced / Deficit on net amount
//! - High Withdraw: withdraw > ratio x deposit
//! - VIP: deposit > VIP threshold
//! - High Risk: withdraw / deposit > ratio, zero deposit per policy
//!
//! Rows are deduplicated by username (first wins) and rows with no
//! activity are dropped before any field is derived.

use std::collections::HashSet;

use crate::config::{GradeBounds, NetBounds, SegmentationConfig, ZeroDepositPolicy};
use crate::error::{SegmentError, SegmentResult};
use crate::types::{EnrichedRecord, Grade, NetCategory, RawRecord};

/// Grade from the deposit amount. First matching bound wins; bounds are exclusive.
pub fn classify_grade(deposit_amount: f64, bounds: &GradeBounds) -> Grade {
    if deposit_amount > bounds.aaa {
        Grade::Aaa
    } else if deposit_amount > bounds.a {
        Grade::A
    } else if deposit_amount > bounds.b {
        Grade::B
    } else if deposit_amount > bounds.c {
        Grade::C
    } else {
        Grade::D
    }
}

/// Net category from the signed net amount.
pub fn classify_net(net_amount: f64, bounds: &NetBounds) -> NetCategory {
    if net_amount > bounds.high_surplus {
        NetCategory::HighSurplus
    } else if net_amount > 0.0 {
        NetCategory::Surplus
    } else if net_amount == 0.0 {
        NetCategory::Balanced
    } else {
        NetCategory::Deficit
    }
}

/// Withdrawals exceed `ratio` of the deposit.
pub fn is_high_withdraw(deposit_amount: f64, withdraw_amount: f64, ratio: f64) -> bool {
    withdraw_amount > deposit_amount * ratio
}

/// Withdraw/deposit ratio exceeds `config.high_risk_ratio`.
///
/// A zero deposit leaves the ratio undefined; the outcome is decided by
/// `config.zero_deposit_policy` instead of by float division.
pub fn is_high_risk(
    username: &str,
    deposit_amount: f64,
    withdraw_amount: f64,
    config: &SegmentationConfig,
) -> SegmentResult<bool> {
    if deposit_amount == 0.0 {
        return match config.zero_deposit_policy {
            ZeroDepositPolicy::NotHighRisk => Ok(false),
            ZeroDepositPolicy::HighRisk => Ok(withdraw_amount > 0.0),
            ZeroDepositPolicy::Reject => Err(SegmentError::DivisionByZero {
                username: username.to_string(),
            }),
        };
    }
    Ok(withdraw_amount / deposit_amount > config.high_risk_ratio)
}

/// Derive every segmentation field for a single row.
pub fn enrich_record(
    raw: &RawRecord,
    config: &SegmentationConfig,
) -> SegmentResult<EnrichedRecord> {
    let net_amount = raw.deposit_amount - raw.withdraw_amount;

    Ok(EnrichedRecord {
        username: raw.username.clone(),
        deposit_amount: raw.deposit_amount,
        withdraw_amount: raw.withdraw_amount,
        net_amount,
        profit: net_amount,
        grade: classify_grade(raw.deposit_amount, &config.grade_bounds),
        net_category: classify_net(net_amount, &config.net_bounds),
        high_withdraw: is_high_withdraw(
            raw.deposit_amount,
            raw.withdraw_amount,
            config.high_withdraw_ratio,
        ),
        vip: raw.deposit_amount > config.vip_threshold,
        high_risk: is_high_risk(
            &raw.username,
            raw.deposit_amount,
            raw.withdraw_amount,
            config,
        )?,
    })
}

/// Keep the first row for each username, preserving input order.
///
/// Returns the surviving rows and how many duplicates were dropped.
pub fn dedup_keep_first(rows: Vec<RawRecord>) -> (Vec<RawRecord>, usize) {
    let total = rows.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let kept: Vec<RawRecord> = rows
        .into_iter()
        .filter(|row| seen.insert(row.username.clone()))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Enrich a full report: dedup, drop inactive rows, derive fields.
///
/// Any failure aborts the whole batch; no partial result is returned.
pub fn enrich(
    rows: Vec<RawRecord>,
    config: &SegmentationConfig,
) -> SegmentResult<Vec<EnrichedRecord>> {
    let (unique, duplicates) = dedup_keep_first(rows);

    let before = unique.len();
    let active: Vec<RawRecord> = unique.into_iter().filter(|r| !r.is_inactive()).collect();
    let inactive = before - active.len();

    log::debug!(
        "dedup dropped={} inactive dropped={} retained={}",
        duplicates,
        inactive,
        active.len()
    );

    let enriched = active
        .iter()
        .map(|raw| enrich_record(raw, config))
        .collect::<SegmentResult<Vec<_>>>()?;

    if enriched.is_empty() {
        log::warn!("no active members after filtering");
    } else {
        log::info!("enriched members={}", enriched.len());
    }

    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::{VIP_THRESHOLD_STANDARD, VIP_THRESHOLD_STRICT};

    fn config() -> SegmentationConfig {
        SegmentationConfig::new(VIP_THRESHOLD_STANDARD)
    }

    fn grade(deposit: f64) -> Grade {
        classify_grade(deposit, &GradeBounds::default())
    }

    fn net(amount: f64) -> NetCategory {
        classify_net(amount, &NetBounds::default())
    }

    #[test]
    fn grade_boundaries_are_exclusive() {
        assert_eq!(grade(5000.01), Grade::Aaa);
        assert_eq!(grade(5000.0), Grade::A);
        assert_eq!(grade(3000.01), Grade::A);
        assert_eq!(grade(3000.0), Grade::B);
        assert_eq!(grade(2000.0), Grade::C);
        assert_eq!(grade(1000.01), Grade::C);
        assert_eq!(grade(1000.0), Grade::D);
        assert_eq!(grade(0.0), Grade::D);
        assert_eq!(grade(-50.0), Grade::D);
    }

    #[test]
    fn large_deposits_are_always_aaa() {
        for deposit in [5000.5, 7500.0, 1_000_000.0] {
            assert_eq!(grade(deposit), Grade::Aaa);
        }
    }

    #[test]
    fn net_category_boundaries() {
        assert_eq!(net(5000.01), NetCategory::HighSurplus);
        assert_eq!(net(5000.0), NetCategory::Surplus);
        assert_eq!(net(0.01), NetCategory::Surplus);
        assert_eq!(net(0.0), NetCategory::Balanced);
        assert_eq!(net(-0.01), NetCategory::Deficit);
    }

    #[test]
    fn zero_net_is_balanced_exactly() {
        let row = RawRecord::new("even", 1234.5, 1234.5);
        let enriched = enrich_record(&row, &config()).unwrap();
        assert_eq!(enriched.net_amount, 0.0);
        assert_eq!(enriched.net_category, NetCategory::Balanced);
    }

    #[test]
    fn custom_grade_bounds_are_applied() {
        let bounds = GradeBounds {
            aaa: 10_000.0,
            a: 6000.0,
            b: 4000.0,
            c: 2000.0,
        };
        assert_eq!(classify_grade(7000.0, &bounds), Grade::A);
        assert_eq!(classify_grade(10_000.0, &bounds), Grade::A);
        assert_eq!(classify_grade(1500.0, &bounds), Grade::D);
    }

    #[test]
    fn high_withdraw_compares_against_half_deposit() {
        assert!(is_high_withdraw(1000.0, 500.01, 0.5));
        assert!(!is_high_withdraw(1000.0, 500.0, 0.5));
        assert!(is_high_withdraw(0.0, 10.0, 0.5));
    }

    #[test]
    fn vip_follows_configured_threshold() {
        let row = RawRecord::new("whale", 15_000.0, 0.0);
        assert!(enrich_record(&row, &config()).unwrap().vip);
        let strict = SegmentationConfig::new(VIP_THRESHOLD_STRICT);
        assert!(!enrich_record(&row, &strict).unwrap().vip);

        let at_threshold = RawRecord::new("edge", 10_000.0, 0.0);
        assert!(!enrich_record(&at_threshold, &config()).unwrap().vip);
    }

    #[test]
    fn high_risk_ratio_is_strict() {
        let cfg = config();
        assert!(is_high_risk("m", 1000.0, 901.0, &cfg).unwrap());
        assert!(!is_high_risk("m", 1000.0, 900.0, &cfg).unwrap());
        let relaxed = config().with_high_risk_ratio(1.5);
        assert!(!is_high_risk("m", 1000.0, 1200.0, &relaxed).unwrap());
    }

    #[test]
    fn zero_deposit_high_risk_follows_policy() {
        let row = RawRecord::new("drain", 0.0, 300.0);

        let not_flagged = enrich_record(&row, &config()).unwrap();
        assert!(!not_flagged.high_risk);

        let flagged_cfg = config().with_zero_deposit_policy(ZeroDepositPolicy::HighRisk);
        assert!(enrich_record(&row, &flagged_cfg).unwrap().high_risk);

        let reject_cfg = config().with_zero_deposit_policy(ZeroDepositPolicy::Reject);
        match enrich_record(&row, &reject_cfg) {
            Err(SegmentError::DivisionByZero { username }) => assert_eq!(username, "drain"),
            other => panic!("expected DivisionByZero, got {other:?}"),
        }
    }

    #[test]
    fn profit_equals_net_amount() {
        let row = RawRecord::new("p", 2500.0, 2600.0);
        let enriched = enrich_record(&row, &config()).unwrap();
        assert_eq!(enriched.profit, enriched.net_amount);
        assert!((enriched.net_amount - (-100.0)).abs() < 0.01);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let rows = vec![
            RawRecord::new("alice", 6000.0, 1000.0),
            RawRecord::new("bob", 2500.0, 2600.0),
            RawRecord::new("alice", 100.0, 50.0),
            RawRecord::new("bob", 1.0, 1.0),
        ];
        let (kept, dropped) = dedup_keep_first(rows);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], RawRecord::new("alice", 6000.0, 1000.0));
        assert_eq!(kept[1], RawRecord::new("bob", 2500.0, 2600.0));
    }

    #[test]
    fn alice_and_bob_scenario() {
        let rows = vec![
            RawRecord::new("alice", 6000.0, 1000.0),
            RawRecord::new("bob", 2500.0, 2600.0),
            RawRecord::new("alice", 100.0, 50.0),
        ];
        let enriched = enrich(rows, &config()).unwrap();
        assert_eq!(enriched.len(), 2);

        let alice = &enriched[0];
        assert_eq!(alice.username, "alice");
        assert!((alice.net_amount - 5000.0).abs() < 0.01);
        assert_eq!(alice.grade, Grade::Aaa);
        assert_eq!(alice.net_category, NetCategory::Surplus);
        assert!(!alice.high_withdraw);
        assert!(!alice.high_risk);

        let bob = &enriched[1];
        assert_eq!(bob.username, "bob");
        assert!((bob.net_amount - (-100.0)).abs() < 0.01);
        assert_eq!(bob.grade, Grade::B);
        assert_eq!(bob.net_category, NetCategory::Deficit);
        assert!(bob.high_withdraw);
        assert!(bob.high_risk);
    }

    #[test]
    fn inactive_rows_are_never_enriched() {
        let rows = vec![
            RawRecord::new("idle", 0.0, 0.0),
            RawRecord::new("active", 10.0, 0.0),
        ];
        // Reject would fail on "idle" if it reached the high-risk check.
        let cfg = config().with_zero_deposit_policy(ZeroDepositPolicy::Reject);
        let enriched = enrich(rows, &cfg).unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].username, "active");
    }

    #[test]
    fn duplicate_of_inactive_first_row_stays_dropped() {
        let rows = vec![
            RawRecord::new("ghost", 0.0, 0.0),
            RawRecord::new("ghost", 500.0, 0.0),
        ];
        let enriched = enrich(rows, &config()).unwrap();
        assert!(enriched.is_empty());
    }

    #[test]
    fn enrichment_error_aborts_whole_batch() {
        let rows = vec![
            RawRecord::new("ok", 1000.0, 10.0),
            RawRecord::new("zero", 0.0, 10.0),
            RawRecord::new("also-ok", 2000.0, 10.0),
        ];
        let cfg = config().with_zero_deposit_policy(ZeroDepositPolicy::Reject);
        assert!(matches!(
            enrich(rows, &cfg),
            Err(SegmentError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn output_preserves_input_order() {
        let rows = vec![
            RawRecord::new("c", 100.0, 0.0),
            RawRecord::new("a", 9000.0, 0.0),
            RawRecord::new("b", 2500.0, 0.0),
        ];
        let names: Vec<String> = enrich(rows, &config())
            .unwrap()
            .into_iter()
            .map(|r| r.username)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
