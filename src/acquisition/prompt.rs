//! Interactive prompts for the input file and success threshold
//!
//! Both loops are generic over the reader and writer so they run against
//! stdin/stdout in the binary and byte buffers in tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use super::{read_sectors, IngestError};
use crate::types::{Sector, SuccessThreshold};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before a valid answer was given")]
    Closed,

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {source}")]
    Ingest { path: PathBuf, source: IngestError },
}

const INPUT_PATH_QUESTION: &str = "What is the source csv file? ";
const THRESHOLD_QUESTION: &str = "What is the RRC Success Rate Percentage Threshold? ";

/// Print `question` and read one line, without its line terminator.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String, PromptError> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PromptError::Closed);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask for a CSV file until one can be opened, then load it.
///
/// Only unreadable files are asked again. A file that opens but holds
/// invalid sectors is returned as `PromptError::Ingest`.
pub fn prompt_input_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<(PathBuf, Vec<Sector>), PromptError> {
    loop {
        let answer = ask(input, output, INPUT_PATH_QUESTION)?;
        let path = PathBuf::from(answer.trim());
        match read_sectors(&path) {
            Ok(sectors) => return Ok((path, sectors)),
            Err(IngestError::Io(e)) => {
                debug!(path = %path.display(), error = %e, "Input file unreadable");
                writeln!(output, "Could not read {}, please try again", path.display())?;
            }
            Err(source) => return Err(PromptError::Ingest { path, source }),
        }
    }
}

/// Ask for the success threshold until the answer is a valid percentage.
pub fn prompt_threshold<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<SuccessThreshold, PromptError> {
    loop {
        let answer = ask(input, output, THRESHOLD_QUESTION)?;
        match SuccessThreshold::parse_input(&answer) {
            Ok(threshold) => return Ok(threshold),
            Err(e) => {
                debug!(input = %answer, error = %e, "Rejected threshold");
                writeln!(
                    output,
                    "RRC Success Rate Threshold should be a percentage value between 0 and 100, please try again"
                )?;
            }
        }
    }
}
