//! Analysis Configuration - every tunable of the tilt analysis as TOML values
//!
//! Each struct implements `Default` with the values in `defaults.rs`, so a
//! run with no config file behaves exactly like the built-in heuristic.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{
    CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_AZIMUTH_TOLERANCE_DEG, DEFAULT_OUTPUT_PATH,
    DEFAULT_OVERSHOOT_MARGIN, DEFAULT_SECTORS_PER_SITE, DEFAULT_UNDERSHOOT_RATIO,
};
use crate::geodesy::EARTH_MEAN_RADIUS_KM;
use crate::types::SuccessThreshold;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an analysis run.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$SECTOR_TILT_CONFIG` env var
/// 2. `./sector_tilt.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Run-level parameters
    #[serde(default)]
    pub analysis: RunConfig,

    /// Forward neighbour search
    #[serde(default)]
    pub neighbor: NeighborConfig,

    /// Overshoot / undershoot decision margins
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Input / output locations
    #[serde(default)]
    pub io: IoConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SECTOR_TILT_CONFIG` environment variable
    /// 2. `./sector_tilt.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analysis config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check working directory
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded analysis config");
                    return config;
                }
                Err(e) => {
                    warn!(path = %local.display(), error = %e, "Failed to load config, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Analysis config saved");
        Ok(())
    }

    /// Threshold from the config file, if one was set and is in range.
    pub fn success_threshold(&self) -> Option<SuccessThreshold> {
        self.analysis
            .success_threshold_percent
            .and_then(|p| SuccessThreshold::new(p).ok())
    }

    /// Validate every value for internal consistency.
    ///
    /// Rules:
    /// - At least one ranking position is skipped (the source itself)
    /// - The forward cone half-width lies in (0, 180]
    /// - Earth radius and both margins are positive and finite
    /// - The undershoot ratio is below the overshoot margin
    /// - A configured threshold is a percentage
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let n = &self.neighbor;
        if n.sectors_per_site == 0 {
            errors.push(
                "neighbor.sectors_per_site must be >= 1 (position 0 is the sector itself)"
                    .to_string(),
            );
        }
        Self::check_positive(n.azimuth_tolerance_deg, "neighbor.azimuth_tolerance_deg", &mut errors);
        if n.azimuth_tolerance_deg > 180.0 {
            errors.push(format!(
                "neighbor.azimuth_tolerance_deg ({:.1}) must be <= 180",
                n.azimuth_tolerance_deg
            ));
        }
        Self::check_positive(n.earth_radius_km, "neighbor.earth_radius_km", &mut errors);

        let a = &self.advisor;
        Self::check_positive(a.overshoot_margin, "advisor.overshoot_margin", &mut errors);
        Self::check_positive(a.undershoot_ratio, "advisor.undershoot_ratio", &mut errors);
        if a.overshoot_margin.is_finite()
            && a.undershoot_ratio.is_finite()
            && a.undershoot_ratio >= a.overshoot_margin
        {
            errors.push(format!(
                "advisor.undershoot_ratio ({:.3}) must be < overshoot_margin ({:.3})",
                a.undershoot_ratio, a.overshoot_margin
            ));
        }

        if let Some(p) = self.analysis.success_threshold_percent {
            if let Err(e) = SuccessThreshold::new(p) {
                errors.push(format!("analysis.success_threshold_percent: {e}"));
            }
        }

        if self.io.output_path.as_os_str().is_empty() {
            errors.push("io.output_path must not be empty".to_string());
        }

        // Physical range validation
        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN compares false against every bound
        if !value.is_finite() {
            errors.push(format!("{name}: value must be finite (got {value})"));
            return;
        }
        if value <= 0.0 {
            errors.push(format!("{name} must be > 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Run Config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Success ratio threshold (percent). Prompted for when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold_percent: Option<u32>,
}

// ============================================================================
// Neighbour Search
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborConfig {
    /// Ranking positions skipped before the forward scan starts
    /// (the sector itself plus its co-sited siblings)
    #[serde(default = "default_sectors_per_site")]
    pub sectors_per_site: usize,

    /// Half-width of the forward cone around the sector azimuth (degrees)
    #[serde(default = "default_azimuth_tolerance_deg")]
    pub azimuth_tolerance_deg: f64,

    /// Sphere radius used to turn central angles into kilometres
    #[serde(default = "default_earth_radius_km")]
    pub earth_radius_km: f64,
}

fn default_sectors_per_site() -> usize {
    DEFAULT_SECTORS_PER_SITE
}
fn default_azimuth_tolerance_deg() -> f64 {
    DEFAULT_AZIMUTH_TOLERANCE_DEG
}
fn default_earth_radius_km() -> f64 {
    EARTH_MEAN_RADIUS_KM
}

impl Default for NeighborConfig {
    fn default() -> Self {
        Self {
            sectors_per_site: default_sectors_per_site(),
            azimuth_tolerance_deg: default_azimuth_tolerance_deg(),
            earth_radius_km: default_earth_radius_km(),
        }
    }
}

// ============================================================================
// Tilt Advisor
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// `timing_advance × overshoot_margin > distance` flags an overshooter
    #[serde(default = "default_overshoot_margin")]
    pub overshoot_margin: f64,

    /// `timing_advance × undershoot_ratio < distance` flags an undershooter
    #[serde(default = "default_undershoot_ratio")]
    pub undershoot_ratio: f64,
}

fn default_overshoot_margin() -> f64 {
    DEFAULT_OVERSHOOT_MARGIN
}
fn default_undershoot_ratio() -> f64 {
    DEFAULT_UNDERSHOOT_RATIO
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            overshoot_margin: default_overshoot_margin(),
            undershoot_ratio: default_undershoot_ratio(),
        }
    }
}

// ============================================================================
// I/O
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoConfig {
    /// Where analysed sectors are written.
    ///
    /// Can be overridden by the `--output` CLI flag.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: AnalysisConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.neighbor.sectors_per_site, 3);
        assert_eq!(config.neighbor.azimuth_tolerance_deg, 60.0);
        assert_eq!(config.neighbor.earth_radius_km, 6371.0);
        assert_eq!(config.advisor.overshoot_margin, 1.1);
        assert_eq!(config.advisor.undershoot_ratio, 0.25);
        assert_eq!(config.io.output_path, PathBuf::from("output.csv"));
        assert_eq!(config.analysis.success_threshold_percent, None);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[analysis]
success_threshold_percent = 95

[neighbor]
sectors_per_site = 6
"#;
        let config = AnalysisConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.neighbor.sectors_per_site, 6);
        assert_eq!(config.success_threshold().map(|t| t.percent()), Some(95));
        // Non-overridden values retain defaults
        assert_eq!(config.neighbor.azimuth_tolerance_deg, 60.0);
        assert_eq!(config.advisor.overshoot_margin, 1.1);
    }

    #[test]
    fn test_validation_catches_zero_skip() {
        let mut config = AnalysisConfig::default();
        config.neighbor.sectors_per_site = 0;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("sectors_per_site")));
        }
    }

    #[test]
    fn test_validation_catches_bad_cone() {
        let mut config = AnalysisConfig::default();
        config.neighbor.azimuth_tolerance_deg = 200.0;
        assert!(config.validate().is_err());

        config.neighbor.azimuth_tolerance_deg = 0.0;
        assert!(config.validate().is_err());

        config.neighbor.azimuth_tolerance_deg = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_inverted_margins() {
        let mut config = AnalysisConfig::default();
        config.advisor.overshoot_margin = 0.2;
        config.advisor.undershoot_ratio = 0.5;
        let result = config.validate();
        assert!(result.is_err(), "Undershoot ratio above overshoot margin should fail");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("undershoot_ratio")));
        }
    }

    #[test]
    fn test_validation_catches_threshold_over_100() {
        let toml_str = r#"
[analysis]
success_threshold_percent = 120
"#;
        let result = AnalysisConfig::from_toml_str(toml_str);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let mut config = AnalysisConfig::default();
        config.neighbor.earth_radius_km = -1.0;
        config.advisor.undershoot_ratio = 0.0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert!(errors.len() >= 2, "{errors:?}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = AnalysisConfig::from_toml_str("[neighbor\nsectors_per_site = 3");
        assert!(matches!(result, Err(ConfigError::Parse(..))));
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut original = AnalysisConfig::default();
        original.analysis.success_threshold_percent = Some(90);
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: AnalysisConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn test_all_sections_serialize() {
        let toml_str = AnalysisConfig::default().to_toml().expect("serialization should work");
        assert!(toml_str.contains("[neighbor]"), "Missing [neighbor] section");
        assert!(toml_str.contains("[advisor]"), "Missing [advisor] section");
        assert!(toml_str.contains("[io]"), "Missing [io] section");
        assert!(toml_str.contains("sectors_per_site"), "Missing sectors_per_site field");
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let result = AnalysisConfig::load_from_file(Path::new("/nonexistent/sector_tilt.toml"));
        assert!(matches!(result, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sector_tilt.toml");
        let mut config = AnalysisConfig::default();
        config.neighbor.sectors_per_site = 2;
        config.save_to_file(&path).expect("save");
        let loaded = AnalysisConfig::load_from_file(&path).expect("load");
        assert_eq!(loaded.neighbor.sectors_per_site, 2);
    }
}
