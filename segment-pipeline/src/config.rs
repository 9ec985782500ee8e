//! Segmentation configuration.
//!
//! Report variants disagree on the VIP threshold, so it has no default and
//! must be chosen by the caller. Every other threshold defaults to the
//! values in [`crate::thresholds`] and can be overridden.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};
use crate::thresholds;

/// Lower (exclusive) deposit bounds for each grade above D.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeBounds {
    pub aaa: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for GradeBounds {
    fn default() -> Self {
        Self {
            aaa: thresholds::GRADE_AAA_MIN_DEPOSIT,
            a: thresholds::GRADE_A_MIN_DEPOSIT,
            b: thresholds::GRADE_B_MIN_DEPOSIT,
            c: thresholds::GRADE_C_MIN_DEPOSIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetBounds {
    /// Net amount above which a member is High Surplus.
    pub high_surplus: f64,
}

impl Default for NetBounds {
    fn default() -> Self {
        Self {
            high_surplus: thresholds::HIGH_SURPLUS_MIN_NET,
        }
    }
}

/// What High Risk means for a member whose deposit is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroDepositPolicy {
    /// The ratio is undefined; the member is not flagged.
    #[default]
    NotHighRisk,
    /// Any withdrawal against a zero deposit is flagged.
    HighRisk,
    /// Abort the ingest with `SegmentError::DivisionByZero`.
    Reject,
}

impl std::str::FromStr for ZeroDepositPolicy {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "not-high-risk" | "false" => Ok(ZeroDepositPolicy::NotHighRisk),
            "high-risk" | "true" => Ok(ZeroDepositPolicy::HighRisk),
            "reject" | "error" => Ok(ZeroDepositPolicy::Reject),
            other => Err(SegmentError::InvalidConfig(format!(
                "unknown zero deposit policy '{}'",
                other
            ))),
        }
    }
}

/// Thresholds applied by the enrichment engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Deposit above which a member is VIP. Required.
    pub vip_threshold: f64,
    #[serde(default = "default_high_risk_ratio")]
    pub high_risk_ratio: f64,
    #[serde(default = "default_high_withdraw_ratio")]
    pub high_withdraw_ratio: f64,
    #[serde(default)]
    pub grade_bounds: GradeBounds,
    #[serde(default)]
    pub net_bounds: NetBounds,
    #[serde(default)]
    pub zero_deposit_policy: ZeroDepositPolicy,
}

fn default_high_risk_ratio() -> f64 {
    thresholds::HIGH_RISK_RATIO
}

fn default_high_withdraw_ratio() -> f64 {
    thresholds::HIGH_WITHDRAW_RATIO
}

impl SegmentationConfig {
    /// Default thresholds with an explicit VIP threshold.
    pub fn new(vip_threshold: f64) -> Self {
        Self {
            vip_threshold,
            high_risk_ratio: thresholds::HIGH_RISK_RATIO,
            high_withdraw_ratio: thresholds::HIGH_WITHDRAW_RATIO,
            grade_bounds: GradeBounds::default(),
            net_bounds: NetBounds::default(),
            zero_deposit_policy: ZeroDepositPolicy::default(),
        }
    }

    pub fn with_vip_threshold(mut self, vip_threshold: f64) -> Self {
        self.vip_threshold = vip_threshold;
        self
    }

    pub fn with_high_risk_ratio(mut self, ratio: f64) -> Self {
        self.high_risk_ratio = ratio;
        self
    }

    pub fn with_high_withdraw_ratio(mut self, ratio: f64) -> Self {
        self.high_withdraw_ratio = ratio;
        self
    }

    pub fn with_grade_bounds(mut self, bounds: GradeBounds) -> Self {
        self.grade_bounds = bounds;
        self
    }

    pub fn with_net_bounds(mut self, bounds: NetBounds) -> Self {
        self.net_bounds = bounds;
        self
    }

    pub fn with_zero_deposit_policy(mut self, policy: ZeroDepositPolicy) -> Self {
        self.zero_deposit_policy = policy;
        self
    }

    /// Check that every threshold is usable.
    pub fn validate(&self) -> SegmentResult<()> {
        let amounts = [
            ("vip_threshold", self.vip_threshold),
            ("grade_bounds.aaa", self.grade_bounds.aaa),
            ("grade_bounds.a", self.grade_bounds.a),
            ("grade_bounds.b", self.grade_bounds.b),
            ("grade_bounds.c", self.grade_bounds.c),
            ("net_bounds.high_surplus", self.net_bounds.high_surplus),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(SegmentError::InvalidConfig(format!(
                    "{} must be a finite non-negative amount, got {}",
                    name, value
                )));
            }
        }

        let ratios = [
            ("high_risk_ratio", self.high_risk_ratio),
            ("high_withdraw_ratio", self.high_withdraw_ratio),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value <= 0.0 {
                return Err(SegmentError::InvalidConfig(format!(
                    "{} must be a finite positive ratio, got {}",
                    name, value
                )));
            }
        }

        let g = &self.grade_bounds;
        if !(g.aaa > g.a && g.a > g.b && g.b > g.c) {
            return Err(SegmentError::InvalidConfig(format!(
                "grade bounds must be strictly descending (aaa > a > b > c), got {} / {} / {} / {}",
                g.aaa, g.a, g.b, g.c
            )));
        }

        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> SegmentResult<Self> {
        let config: SegmentationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load_file(path: impl AsRef<Path>) -> SegmentResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| SegmentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn new_uses_default_thresholds() {
        let config = SegmentationConfig::new(thresholds::VIP_THRESHOLD_STANDARD);
        assert_eq!(config.vip_threshold, 10_000.0);
        assert_eq!(config.high_risk_ratio, 0.9);
        assert_eq!(config.high_withdraw_ratio, 0.5);
        assert_eq!(config.grade_bounds.aaa, 5000.0);
        assert_eq!(config.grade_bounds.c, 1000.0);
        assert_eq!(config.net_bounds.high_surplus, 5000.0);
        assert_eq!(config.zero_deposit_policy, ZeroDepositPolicy::NotHighRisk);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_fills_defaults_except_vip() {
        let config = SegmentationConfig::from_json_str(r#"{"vip_threshold": 20000}"#).unwrap();
        assert_eq!(config.vip_threshold, 20_000.0);
        assert_eq!(config.high_risk_ratio, 0.9);
        assert_eq!(config.grade_bounds, GradeBounds::default());
    }

    #[test]
    fn json_without_vip_threshold_is_rejected() {
        let err = SegmentationConfig::from_json_str(r#"{"high_risk_ratio": 0.8}"#).unwrap_err();
        assert!(matches!(err, SegmentError::Config(_)));
    }

    #[test]
    fn json_overrides_nested_bounds_and_policy() {
        let json = r#"{
            "vip_threshold": 15000,
            "grade_bounds": {"aaa": 8000},
            "zero_deposit_policy": "reject"
        }"#;
        let config = SegmentationConfig::from_json_str(json).unwrap();
        assert_eq!(config.grade_bounds.aaa, 8000.0);
        assert_eq!(config.grade_bounds.a, 3000.0);
        assert_eq!(config.zero_deposit_policy, ZeroDepositPolicy::Reject);
    }

    #[test]
    fn non_descending_grade_bounds_fail_validation() {
        let config = SegmentationConfig::new(10_000.0).with_grade_bounds(GradeBounds {
            aaa: 3000.0,
            a: 3000.0,
            b: 2000.0,
            c: 1000.0,
        });
        assert!(matches!(
            config.validate(),
            Err(SegmentError::InvalidConfig(_))
        ));
    }

    #[test]
    fn negative_net_bound_fails_validation() {
        let config = SegmentationConfig::new(10_000.0).with_net_bounds(NetBounds {
            high_surplus: -1.0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_ratios_fail_validation() {
        let zero = SegmentationConfig::new(10_000.0).with_high_risk_ratio(0.0);
        assert!(zero.validate().is_err());
        let nan = SegmentationConfig::new(10_000.0).with_high_withdraw_ratio(f64::NAN);
        assert!(nan.validate().is_err());
        let negative_vip = SegmentationConfig::new(-1.0);
        assert!(negative_vip.validate().is_err());
    }

    #[test]
    fn zero_deposit_policy_parses_cli_spellings() {
        assert_eq!(
            "not-high-risk".parse::<ZeroDepositPolicy>().unwrap(),
            ZeroDepositPolicy::NotHighRisk
        );
        assert_eq!(
            "HIGH_RISK".parse::<ZeroDepositPolicy>().unwrap(),
            ZeroDepositPolicy::HighRisk
        );
        assert_eq!(
            "reject".parse::<ZeroDepositPolicy>().unwrap(),
            ZeroDepositPolicy::Reject
        );
        assert!("maybe".parse::<ZeroDepositPolicy>().is_err());
    }

    #[test]
    fn load_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"vip_threshold": 10000, "high_withdraw_ratio": 0.6}}"#).unwrap();
        let config = SegmentationConfig::load_file(file.path()).unwrap();
        assert_eq!(config.high_withdraw_ratio, 0.6);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let err = SegmentationConfig::load_file("/nonexistent/segment.json").unwrap_err();
        assert!(matches!(err, SegmentError::Io { .. }));
    }
}
