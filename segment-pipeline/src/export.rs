//! CSV export of enriched members.
//!
//! Columns follow the report headers:
//!   Username, Deposit Amount, Withdraw Amount, Net Amount, Profit,
//!   Grade, Net Category, High Withdraw, VIP, High Risk

use std::io::Write;
use std::path::Path;

use crate::error::{SegmentError, SegmentResult};
use crate::types::EnrichedRecord;

/// Write every member with all derived fields to a CSV writer.
///
/// The header row is always written, so an empty table still yields the
/// column names.
pub fn write_members_csv<W: Write>(records: &[EnrichedRecord], writer: W) -> SegmentResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(EnrichedRecord::COLUMNS)
        .map_err(|source| SegmentError::Csv { line: 1, source })?;
    for (idx, record) in records.iter().enumerate() {
        csv_writer
            .serialize(record)
            .map_err(|source| SegmentError::Csv {
                line: idx + 2,
                source,
            })?;
    }
    csv_writer.flush().map_err(|source| SegmentError::Io {
        path: "<csv writer>".to_string(),
        source,
    })?;
    Ok(())
}

/// Write the members CSV to a file, replacing any existing file.
pub fn write_members_csv_file(
    records: &[EnrichedRecord],
    path: impl AsRef<Path>,
) -> SegmentResult<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| SegmentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_members_csv(records, file)?;
    log::info!("exported members={} path={}", records.len(), path.display());
    Ok(())
}
