//! sector-tilt - coverage-driven antenna tilt advisor
//!
//! Reads per-cell counters from CSV, finds each sector's forward neighbour,
//! and writes the sectors back out with adjusted tilt and a state label.
//!
//! # Usage
//!
//! ```bash
//! # Interactive: asks for the input file and the threshold
//! sector-tilt
//!
//! # Non-interactive
//! sector-tilt --input cells.csv --threshold 95% --output tilted.csv
//!
//! # Also write a JSON report of every decision
//! sector-tilt --input cells.csv --threshold 95 --report-json report.json
//! ```
//!
//! # Environment Variables
//!
//! - `SECTOR_TILT_CONFIG`: Path to a TOML config file
//! - `SECTOR_TILT_OUTPUT`: Output CSV path (same as `--output`)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use sector_tilt::acquisition::{prompt_input_path, prompt_threshold, read_sectors};
use sector_tilt::config::{self, AnalysisConfig};
use sector_tilt::report::{save_report_json, save_sectors_csv};
use sector_tilt::types::{SectorState, SuccessThreshold};
use sector_tilt::run_analysis;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sector-tilt")]
#[command(about = "Recommend antenna tilt changes from timing advance and neighbour distance")]
#[command(version)]
struct CliArgs {
    /// Sector CSV file. Prompted for when omitted.
    #[arg(short, long, value_name = "CSV")]
    input: Option<PathBuf>,

    /// Success ratio threshold, e.g. `95`, `95%` or `%95`.
    /// Falls back to the config file, then to a prompt.
    #[arg(short, long, value_parser = SuccessThreshold::parse_input)]
    threshold: Option<SuccessThreshold>,

    /// Output CSV path (default from config: output.csv)
    #[arg(short, long, value_name = "CSV", env = "SECTOR_TILT_OUTPUT")]
    output: Option<PathBuf>,

    /// Load this TOML config instead of searching; any error is fatal
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Also write a JSON report of the analysis
    #[arg(long, value_name = "JSON")]
    report_json: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    match explicit {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AnalysisConfig::load()),
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    config::init(load_config(args.config.as_deref())?);
    let cfg = config::get();

    if args.print_config {
        print!("{}", cfg.to_toml().context("Failed to serialize config")?);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    // Sectors
    let mut sectors = match &args.input {
        Some(path) => read_sectors(path)
            .with_context(|| format!("Failed to load sectors from {}", path.display()))?,
        None => {
            let (path, sectors) = prompt_input_path(&mut input, &mut output)
                .context("Failed to read the source csv file")?;
            debug!(path = %path.display(), "Input chosen interactively");
            sectors
        }
    };

    // Threshold
    let threshold = match args.threshold.or_else(|| cfg.success_threshold()) {
        Some(t) => t,
        None => prompt_threshold(&mut input, &mut output)
            .context("Failed to read the success threshold")?,
    };
    info!(sectors = sectors.len(), threshold = %threshold, "Starting analysis");

    let report = run_analysis(&mut sectors, threshold, cfg);

    for sector in sectors.iter().filter(|s| s.state() != SectorState::NoAction) {
        info!("{}", sector);
    }

    let output_path = args.output.as_ref().unwrap_or(&cfg.io.output_path);
    save_sectors_csv(output_path, &sectors)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    writeln!(output, "Results saved under {}", output_path.display())?;

    if let Some(path) = &args.report_json {
        save_report_json(path, &report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    Ok(())
}
