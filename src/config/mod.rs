//! Analysis Configuration Module
//!
//! Every constant of the tilt heuristic (skip count, cone width, margins,
//! Earth radius) is an operator-tunable TOML value.
//!
//! ## Loading Order
//!
//! 1. `SECTOR_TILT_CONFIG` environment variable (path to TOML file)
//! 2. `sector_tilt.toml` in the current working directory
//! 3. Built-in defaults
//!
//! An explicit `--config <path>` on the command line skips the search and
//! fails hard on any error.

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;
pub use validation::ValidationWarning;

use std::sync::OnceLock;

/// Process-wide configuration, set once by the binary.
static ANALYSIS_CONFIG: OnceLock<AnalysisConfig> = OnceLock::new();

/// Initialize the global analysis configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: AnalysisConfig) {
    if ANALYSIS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global analysis configuration.
///
/// Panics if `init()` has not been called.
pub fn get() -> &'static AnalysisConfig {
    ANALYSIS_CONFIG
        .get()
        .expect("config::get() called before config::init()")
}
