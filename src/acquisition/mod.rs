//! Sector Acquisition
//!
//! Loads sector records from a comma-separated export of per-cell counters.
//! Columns are located by header name, so exports with extra or reordered
//! columns load unchanged:
//!
//! | Header           | Field            |
//! |------------------|------------------|
//! | `CellName`       | name             |
//! | `Latitude`       | latitude (deg)   |
//! | `Longitude`      | longitude (deg)  |
//! | `Azimuth`        | azimuth (deg)    |
//! | `RRC_Att`        | attempts         |
//! | `RRC_Succ`       | successes        |
//! | `Timing_Advance` | timing advance   |
//! | `tilt`           | tilt             |

mod prompt;

pub use prompt::{prompt_input_path, prompt_threshold, PromptError};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::{RawSector, Sector, SectorError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is empty (no header row)")]
    EmptyFile,

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: {source}")]
    Row { line: usize, source: SectorError },

    #[error("file contains a header but no sector rows")]
    NoSectors,
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Header indices of the eight sector columns.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    name: usize,
    latitude: usize,
    longitude: usize,
    azimuth: usize,
    attempts: usize,
    successes: usize,
    timing_advance: usize,
    tilt: usize,
}

impl ColumnMap {
    /// Locate every required column in a header row (case-insensitive).
    fn from_header(header: &str) -> Result<Self, IngestError> {
        let columns: Vec<String> = csv_split(header)
            .into_iter()
            .map(|c| c.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let find = |name: &'static str| -> Result<usize, IngestError> {
            columns
                .iter()
                .position(|c| c == &name.to_lowercase())
                .ok_or(IngestError::MissingColumn(name))
        };

        Ok(Self {
            name: find("CellName")?,
            latitude: find("Latitude")?,
            longitude: find("Longitude")?,
            azimuth: find("Azimuth")?,
            attempts: find("RRC_Att")?,
            successes: find("RRC_Succ")?,
            timing_advance: find("Timing_Advance")?,
            tilt: find("tilt")?,
        })
    }

    /// Pick the sector fields out of one split row. Short rows leave the
    /// missing fields empty, which then fail numeric parsing.
    fn extract(&self, fields: &[String]) -> RawSector {
        let get = |idx: usize| fields.get(idx).cloned().unwrap_or_default();
        RawSector {
            name: get(self.name),
            latitude: get(self.latitude),
            longitude: get(self.longitude),
            azimuth: get(self.azimuth),
            attempts: get(self.attempts),
            successes: get(self.successes),
            timing_advance: get(self.timing_advance),
            tilt: get(self.tilt),
        }
    }
}

// ============================================================================
// CSV Parsing
// ============================================================================

/// Split a CSV line on commas, honouring double-quoted fields.
pub(crate) fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Read and validate every sector in a CSV file.
pub fn read_sectors(path: impl AsRef<Path>) -> Result<Vec<Sector>, IngestError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let sectors = parse_sectors(BufReader::new(file))?;
    info!(path = %path.display(), count = sectors.len(), "Loaded sectors");
    Ok(sectors)
}

/// Parse sectors from any buffered reader holding CSV text.
///
/// The first row that fails validation aborts the load. Line numbers in
/// errors are 1-based and count the header.
pub fn parse_sectors<R: BufRead>(reader: R) -> Result<Vec<Sector>, IngestError> {
    let mut lines = reader.lines();

    let header = lines.next().ok_or(IngestError::EmptyFile)??;
    if header.trim().is_empty() {
        return Err(IngestError::EmptyFile);
    }
    let columns = ColumnMap::from_header(&header)?;
    debug!(?columns, "Resolved sector columns");

    let mut sectors = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line_num = idx + 2;
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let raw = columns.extract(&csv_split(line));
        let sector = Sector::try_from(&raw).map_err(|source| IngestError::Row {
            line: line_num,
            source,
        })?;
        sectors.push(sector);
    }

    if sectors.is_empty() {
        return Err(IngestError::NoSectors);
    }
    Ok(sectors)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SectorError;

    const HEADER: &str = "CellName,Latitude,Longitude,Azimuth,RRC_Att,RRC_Succ,Timing_Advance,tilt";

    fn parse(text: &str) -> Result<Vec<Sector>, IngestError> {
        parse_sectors(text.as_bytes())
    }

    #[test]
    fn test_csv_split_simple() {
        assert_eq!(csv_split("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_csv_split_quoted_comma() {
        assert_eq!(csv_split(r#""CELL,1",2,3"#), vec!["CELL,1", "2", "3"]);
    }

    #[test]
    fn test_csv_split_escaped_quote() {
        assert_eq!(csv_split(r#""say ""hi""",x"#), vec![r#"say "hi""#, "x"]);
    }

    #[test]
    fn test_csv_split_trailing_empty() {
        assert_eq!(csv_split("a,"), vec!["a", ""]);
    }

    #[test]
    fn test_parse_basic_rows() {
        let text = format!(
            "{HEADER}\nCELL1,38.130399,-77.513747,0,27,26,0.31,60\n\nCELL2,38.130399,-77.513747,120,34,33,0.31,60\n"
        );
        let sectors = parse(&text).unwrap();
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].name(), "CELL1");
        assert_eq!(sectors[0].attempts(), 27);
        assert_eq!(sectors[1].azimuth(), 120.0);
        assert_eq!(sectors[1].tilt(), 60);
    }

    #[test]
    fn test_columns_found_by_name_any_order_any_case() {
        let text = "tilt,cellname,EXTRA,latitude,LONGITUDE,azimuth,rrc_succ,rrc_att,timing_advance\r\n\
                    40,X1,ignored,1.0,2.0,90,5,10,3.5\r\n";
        let sectors = parse(text).unwrap();
        assert_eq!(sectors[0].name(), "X1");
        assert_eq!(sectors[0].tilt(), 40);
        assert_eq!(sectors[0].attempts(), 10);
        assert_eq!(sectors[0].successes(), 5);
        assert_eq!(sectors[0].timing_advance(), 3.5);
    }

    #[test]
    fn test_missing_column() {
        let text = "CellName,Latitude,Longitude,Azimuth,RRC_Att,RRC_Succ,tilt\nA,1,2,3,4,4,5\n";
        assert!(matches!(
            parse(text),
            Err(IngestError::MissingColumn("Timing_Advance"))
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse(""), Err(IngestError::EmptyFile)));
    }

    #[test]
    fn test_header_only() {
        assert!(matches!(parse(HEADER), Err(IngestError::NoSectors)));
    }

    #[test]
    fn test_first_invalid_row_aborts_with_line_number() {
        let text = format!(
            "{HEADER}\nA,1,2,0,10,5,1.0,20\nB,1,2,0,10,11,1.0,20\nC,1,2,0,-1,0,1.0,20\n"
        );
        match parse(&text) {
            Err(IngestError::Row { line, source }) => {
                assert_eq!(line, 3);
                assert_eq!(
                    source,
                    SectorError::SuccessExceedsAttempts {
                        successes: 11,
                        attempts: 10
                    }
                );
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_number() {
        let text = format!("{HEADER}\nA,north,2,0,10,5,1.0,20\n");
        match parse(&text) {
            Err(IngestError::Row { source, .. }) => {
                assert!(matches!(
                    source,
                    SectorError::InvalidNumber { field: "latitude", .. }
                ));
            }
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn test_short_row_is_rejected() {
        let text = format!("{HEADER}\nA,1,2\n");
        assert!(matches!(parse(&text), Err(IngestError::Row { line: 2, .. })));
    }

    #[test]
    fn test_read_sectors_missing_file_is_io() {
        assert!(matches!(
            read_sectors("/nonexistent/sectors.csv"),
            Err(IngestError::Io(_))
        ));
    }
}
