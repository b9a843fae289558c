//! Result Output
//!
//! Writes analysed sectors back out as CSV and the `AnalysisReport` as
//! pretty-printed JSON.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::pipeline::AnalysisReport;
use crate::types::Sector;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output column order. Azimuth is an input-only column.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "CellName",
    "Latitude",
    "Longitude",
    "RRC_Att",
    "RRC_Succ",
    "Timing_Advance",
    "tilt",
    "state",
];

// ============================================================================
// CSV
// ============================================================================

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Write the header and one row per sector to any writer.
pub fn write_sectors_csv<W: Write>(writer: &mut W, sectors: &[Sector]) -> Result<(), ReportError> {
    writeln!(writer, "{}", OUTPUT_COLUMNS.join(","))?;
    for s in sectors {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            csv_escape(s.name()),
            s.latitude(),
            s.longitude(),
            s.attempts(),
            s.successes(),
            s.timing_advance(),
            s.tilt(),
            csv_escape(s.state().label()),
        )?;
    }
    Ok(())
}

/// Write analysed sectors to a CSV file, replacing it if present.
pub fn save_sectors_csv(path: impl AsRef<Path>, sectors: &[Sector]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_sectors_csv(&mut writer, sectors)?;
    writer.flush()?;
    info!(path = %path.display(), count = sectors.len(), "Sectors written");
    Ok(())
}

// ============================================================================
// JSON
// ============================================================================

/// Write the analysis report as pretty-printed JSON.
pub fn save_report_json(path: impl AsRef<Path>, report: &AnalysisReport) -> Result<(), ReportError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    info!(path = %path.display(), changes = report.changes.len(), "Analysis report written");
    Ok(())
}
