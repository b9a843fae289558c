//! Built-in defaults for every tunable value.
//!
//! Grouped by the component that consumes them.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SECTOR_TILT_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "sector_tilt.toml";

// ============================================================================
// Neighbour Search
// ============================================================================

/// Ranking positions skipped before looking for a forward neighbour.
///
/// Covers the source itself plus its co-sited siblings: three sectors per
/// site, one per 120° arc.
pub const DEFAULT_SECTORS_PER_SITE: usize = 3;

/// Half-width of the forward cone around a sector's azimuth (degrees).
pub const DEFAULT_AZIMUTH_TOLERANCE_DEG: f64 = 60.0;

// ============================================================================
// Tilt Advisor
// ============================================================================

/// Timing advance × this factor above the neighbour distance means overshoot.
pub const DEFAULT_OVERSHOOT_MARGIN: f64 = 1.1;

/// Timing advance × this factor below the neighbour distance means undershoot.
pub const DEFAULT_UNDERSHOOT_RATIO: f64 = 0.25;

// ============================================================================
// Output
// ============================================================================

/// Where analysed sectors are written when nothing else is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "output.csv";
