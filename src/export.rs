//! Writes analysis results to CSV or JSON files.

use analyzer::ReturnSet;
use configuration::ExportFormat;
use core_types::OutputRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column order of exported records.
const OUTPUT_COLUMNS: [&str; 11] = [
    "code",
    "underlying",
    "option_type",
    "issuer_name",
    "strike_price",
    "return_pct",
    "start_price",
    "end_price",
    "start_date",
    "end_date",
    "expiry",
];

/// The rows to export: every record in ranking order, or in `lite` mode the
/// top `n` followed by the bottom `n`.
pub fn select_records(set: &ReturnSet, n: usize, lite: bool) -> Vec<OutputRecord> {
    if lite {
        set.top(n)
            .into_iter()
            .chain(set.bottom(n))
            .map(OutputRecord::from)
            .collect()
    } else {
        set.records().iter().map(OutputRecord::from).collect()
    }
}

/// Writes `records` to `path` in the requested format.
pub fn write_records(path: &Path, records: &[OutputRecord], format: ExportFormat) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(&mut writer, records)?,
        ExportFormat::Json => write_json(&mut writer, records)?,
    }
    writer.flush()?;
    Ok(())
}

/// UTF-8 CSV with a leading byte-order marker so spreadsheet tools pick up the
/// Turkish characters in issuer names.
pub fn write_csv<W: Write>(mut writer: W, records: &[OutputRecord]) -> anyhow::Result<()> {
    writer.write_all("\u{feff}".as_bytes())?;

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// A pretty-printed JSON array of records.
pub fn write_json<W: Write>(writer: W, records: &[OutputRecord]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}
