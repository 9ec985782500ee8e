use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SegmentError;
use crate::util::normalize_label;

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// One row of the member transaction report, as read from CSV.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Deposit Amount", deserialize_with = "deserialize_amount")]
    pub deposit_amount: f64,
    #[serde(rename = "Withdraw Amount", deserialize_with = "deserialize_amount")]
    pub withdraw_amount: f64,
}

impl RawRecord {
    pub fn new(username: &str, deposit_amount: f64, withdraw_amount: f64) -> Self {
        Self {
            username: username.to_string(),
            deposit_amount,
            withdraw_amount,
        }
    }

    /// True when the member moved no money in either direction.
    pub fn is_inactive(&self) -> bool {
        self.deposit_amount <= 0.0 && self.withdraw_amount <= 0.0
    }
}

/// Amount deserializer: blank cells read as zero, everything else must be a
/// finite, non-negative number. `NaN`, `inf` and negatives are rejected.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let amount = s.parse::<f64>().map_err(|_| {
        serde::de::Error::custom(format!("expected numeric amount, got '{}'", s))
    })?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "amount must be a finite non-negative number, got '{}'",
            s
        )));
    }
    Ok(amount)
}

// ---------------------------------------------------------------------------
// Classification types
// ---------------------------------------------------------------------------

/// Customer tier assigned from the deposit amount. Ordered best tier first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    #[serde(rename = "AAA")]
    Aaa,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Every grade, best tier first.
    pub const ALL: [Grade; 5] = [Grade::Aaa, Grade::A, Grade::B, Grade::C, Grade::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Aaa => "AAA",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AAA" => Ok(Grade::Aaa),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            _ => Err(SegmentError::UnknownGrade(s.to_string())),
        }
    }
}

/// Bucket for the signed net amount (deposit minus withdraw).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NetCategory {
    #[serde(rename = "High Surplus")]
    HighSurplus,
    Surplus,
    Balanced,
    Deficit,
}

impl NetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetCategory::HighSurplus => "High Surplus",
            NetCategory::Surplus => "Surplus",
            NetCategory::Balanced => "Balanced",
            NetCategory::Deficit => "Deficit",
        }
    }
}

impl fmt::Display for NetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetCategory {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "high surplus" => Ok(NetCategory::HighSurplus),
            "surplus" => Ok(NetCategory::Surplus),
            "balanced" => Ok(NetCategory::Balanced),
            "deficit" => Ok(NetCategory::Deficit),
            _ => Err(SegmentError::UnknownNetCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Enriched rows
// ---------------------------------------------------------------------------

/// A member row with every derived segmentation field populated.
///
/// Field names serialize as the report column headers so a CSV export
/// matches what the dashboards showed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Deposit Amount")]
    pub deposit_amount: f64,
    #[serde(rename = "Withdraw Amount")]
    pub withdraw_amount: f64,
    #[serde(rename = "Net Amount")]
    pub net_amount: f64,
    /// Always equal to `net_amount`; reported under its own column.
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Grade")]
    pub grade: Grade,
    #[serde(rename = "Net Category")]
    pub net_category: NetCategory,
    #[serde(rename = "High Withdraw")]
    pub high_withdraw: bool,
    #[serde(rename = "VIP")]
    pub vip: bool,
    #[serde(rename = "High Risk")]
    pub high_risk: bool,
}

impl EnrichedRecord {
    /// Report column headers, in field order. Must match the serde renames above.
    pub const COLUMNS: [&'static str; 10] = [
        "Username",
        "Deposit Amount",
        "Withdraw Amount",
        "Net Amount",
        "Profit",
        "Grade",
        "Net Category",
        "High Withdraw",
        "VIP",
        "High Risk",
    ];
}

impl Default for EnrichedRecord {
    fn default() -> Self {
        Self {
            username: String::new(),
            deposit_amount: 0.0,
            withdraw_amount: 0.0,
            net_amount: 0.0,
            profit: 0.0,
            grade: Grade::D,
            net_category: NetCategory::Balanced,
            high_withdraw: false,
            vip: false,
            high_risk: false,
        }
    }
}

/// Numeric column a query can sum or rank by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AmountField {
    Deposit,
    Withdraw,
    NetAmount,
    Profit,
}

impl AmountField {
    /// Read this field from a record.
    pub fn of(&self, record: &EnrichedRecord) -> f64 {
        match self {
            AmountField::Deposit => record.deposit_amount,
            AmountField::Withdraw => record.withdraw_amount,
            AmountField::NetAmount => record.net_amount,
            AmountField::Profit => record.profit,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AmountField::Deposit => "Deposit Amount",
            AmountField::Withdraw => "Withdraw Amount",
            AmountField::NetAmount => "Net Amount",
            AmountField::Profit => "Profit",
        }
    }
}

impl fmt::Display for AmountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AmountField {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "deposit" | "deposit amount" => Ok(AmountField::Deposit),
            "withdraw" | "withdraw amount" => Ok(AmountField::Withdraw),
            "net" | "net amount" => Ok(AmountField::NetAmount),
            "profit" => Ok(AmountField::Profit),
            _ => Err(SegmentError::UnknownField(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Search criteria for the member table. Every criterion left at its
/// default matches all members; set criteria are combined with AND.
#[derive(Clone, Debug, Default)]
pub struct MemberQuery {
    /// Case-insensitive regex matched anywhere in the username.
    /// Empty matches everyone.
    pub username_pattern: String,
    /// Treat `username_pattern` as plain text instead of a regex.
    pub literal: bool,
    /// `None` means every net category.
    pub net_category: Option<NetCategory>,
    pub vip_only: bool,
    pub grade: Option<Grade>,
}

impl MemberQuery {
    /// A query with no criteria.
    pub fn all() -> Self {
        Self::default()
    }

    /// Same criteria, restricted to one grade.
    pub fn in_grade(&self, grade: Grade) -> Self {
        Self {
            grade: Some(grade),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_parses_case_insensitively() {
        assert_eq!("aaa".parse::<Grade>().unwrap(), Grade::Aaa);
        assert_eq!(" B ".parse::<Grade>().unwrap(), Grade::B);
        assert!(matches!(
            "E".parse::<Grade>(),
            Err(SegmentError::UnknownGrade(_))
        ));
    }

    #[test]
    fn grades_order_best_tier_first() {
        let mut grades = vec![Grade::C, Grade::Aaa, Grade::D, Grade::A, Grade::B];
        grades.sort();
        assert_eq!(grades, Grade::ALL.to_vec());
    }

    #[test]
    fn net_category_accepts_label_and_aliases() {
        assert_eq!(
            "High Surplus".parse::<NetCategory>().unwrap(),
            NetCategory::HighSurplus
        );
        assert_eq!(
            "high-surplus".parse::<NetCategory>().unwrap(),
            NetCategory::HighSurplus
        );
        assert_eq!(
            "DEFICIT".parse::<NetCategory>().unwrap(),
            NetCategory::Deficit
        );
        assert!("Loss".parse::<NetCategory>().is_err());
    }

    #[test]
    fn amount_field_reads_matching_column() {
        let record = EnrichedRecord {
            deposit_amount: 100.0,
            withdraw_amount: 40.0,
            net_amount: 60.0,
            profit: 60.0,
            ..EnrichedRecord::default()
        };
        assert_eq!(AmountField::Deposit.of(&record), 100.0);
        assert_eq!(AmountField::Withdraw.of(&record), 40.0);
        assert_eq!(AmountField::Profit.of(&record), 60.0);
        assert_eq!(
            "withdraw_amount".parse::<AmountField>().unwrap(),
            AmountField::Withdraw
        );
        assert_eq!("net".parse::<AmountField>().unwrap(), AmountField::NetAmount);
    }

    #[test]
    fn labels_serialize_as_report_text() {
        assert_eq!(serde_json::to_string(&Grade::Aaa).unwrap(), "\"AAA\"");
        assert_eq!(
            serde_json::to_string(&NetCategory::HighSurplus).unwrap(),
            "\"High Surplus\""
        );
    }

    #[test]
    fn columns_match_serialized_field_names() {
        let value = serde_json::to_value(EnrichedRecord::default()).unwrap();
        let mut serialized: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut columns = EnrichedRecord::COLUMNS.to_vec();
        serialized.sort_unstable();
        columns.sort_unstable();
        assert_eq!(serialized, columns);
    }

    #[test]
    fn in_grade_keeps_other_criteria() {
        let query = MemberQuery {
            username_pattern: "ali".into(),
            vip_only: true,
            ..MemberQuery::all()
        };
        let scoped = query.in_grade(Grade::B);
        assert_eq!(scoped.grade, Some(Grade::B));
        assert_eq!(scoped.username_pattern, "ali");
        assert!(scoped.vip_only);
    }
}
