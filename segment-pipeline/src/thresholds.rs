//! Default classification thresholds for member segmentation.
//!
//! These are the values the member report dashboards have always used.
//! They are defaults only: `SegmentationConfig` carries the values that
//! are actually applied, so every threshold here can be overridden.

/// Deposit above which a member is graded AAA.
pub const GRADE_AAA_MIN_DEPOSIT: f64 = 5000.0;

/// Deposit above which a member is graded A (up to the AAA bound).
pub const GRADE_A_MIN_DEPOSIT: f64 = 3000.0;

/// Deposit above which a member is graded B (up to the A bound).
pub const GRADE_B_MIN_DEPOSIT: f64 = 2000.0;

/// Deposit above which a member is graded C (up to the B bound).
/// Anything at or below this is grade D.
pub const GRADE_C_MIN_DEPOSIT: f64 = 1000.0;

/// Net amount above which a member falls into High Surplus.
pub const HIGH_SURPLUS_MIN_NET: f64 = 5000.0;

/// Withdraw/deposit ratio above which a member is flagged High Risk.
pub const HIGH_RISK_RATIO: f64 = 0.9;

/// Fraction of the deposit that withdrawals must exceed to flag High Withdraw.
pub const HIGH_WITHDRAW_RATIO: f64 = 0.5;

/// VIP deposit threshold used by the single-page segmentation dashboard.
pub const VIP_THRESHOLD_STANDARD: f64 = 10_000.0;

/// VIP deposit threshold used by the stricter report variant.
pub const VIP_THRESHOLD_STRICT: f64 = 20_000.0;
