//! CSV member report loader.
//!
//! Parses a member transaction report into `RawRecord`s.
//! Required columns (header whitespace and case are ignored):
//!   Username, Deposit Amount, Withdraw Amount
//! Any other columns are ignored.

use std::io::Read;
use std::path::Path;

use crate::error::{SegmentError, SegmentResult};
use crate::types::RawRecord;

pub const USERNAME_COLUMN: &str = "Username";
pub const DEPOSIT_COLUMN: &str = "Deposit Amount";
pub const WITHDRAW_COLUMN: &str = "Withdraw Amount";

const REQUIRED_COLUMNS: [&str; 3] = [USERNAME_COLUMN, DEPOSIT_COLUMN, WITHDRAW_COLUMN];

/// Load member rows from a CSV reader.
///
/// Fails before reading any row if a required column is missing.
pub fn load_members<R: Read>(reader: R) -> SegmentResult<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| SegmentError::Csv { line: 1, source })?
        .clone();
    let headers = normalize_headers(&headers)?;
    csv_reader.set_headers(headers);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let line = line_num + 2;
        let record: RawRecord = result.map_err(|source| SegmentError::Csv { line, source })?;
        if record.username.is_empty() {
            return Err(SegmentError::EmptyUsername { line });
        }
        records.push(record);
    }

    log::debug!("loaded member report rows={}", records.len());
    Ok(records)
}

/// Load member rows from a CSV file path.
pub fn load_members_file(path: impl AsRef<Path>) -> SegmentResult<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| SegmentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_members(file)
}

/// Map headers onto the canonical column names and check the required ones exist.
fn normalize_headers(headers: &csv::StringRecord) -> SegmentResult<csv::StringRecord> {
    let normalized: csv::StringRecord = headers
        .iter()
        .map(|h| {
            let h = h.trim();
            REQUIRED_COLUMNS
                .iter()
                .find(|c| c.eq_ignore_ascii_case(h))
                .map(|c| c.to_string())
                .unwrap_or_else(|| h.to_string())
        })
        .collect();

    for column in REQUIRED_COLUMNS {
        if !normalized.iter().any(|h| h == column) {
            return Err(SegmentError::MissingColumn(column.to_string()));
        }
    }

    Ok(normalized)
}
