//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! The raw TOML is first walked as a `toml::Value` tree so misspelled keys
//! (which serde would silently drop in favour of a default) surface as
//! warnings with a "did you mean?" hint. Warnings never reject a config.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `AnalysisConfig`.
///
/// Must be kept in step with the structs in analysis_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [analysis]
        "analysis",
        "analysis.success_threshold_percent",
        // [neighbor]
        "neighbor",
        "neighbor.sectors_per_site",
        "neighbor.azimuth_tolerance_deg",
        "neighbor.earth_radius_km",
        // [advisor]
        "advisor",
        "advisor.overshoot_margin",
        "advisor.undershoot_ratio",
        // [io]
        "io",
        "io.output_path",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, ties broken alphabetically.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Malformed TOML yields no warnings here; serde reports it afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `AnalysisConfig`.
///
/// Returns (errors, warnings). Errors are values no real network can have;
/// warnings are legal but unusual.
pub fn validate_physical_ranges(
    config: &super::AnalysisConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Overshoot margin below 1 flags sectors whose reach is shorter than the
    // neighbour distance
    let margin = config.advisor.overshoot_margin;
    if margin.is_finite() && margin > 0.0 && margin < 1.0 {
        warnings.push(ValidationWarning {
            field: "advisor.overshoot_margin".to_string(),
            message: format!("advisor.overshoot_margin = {margin:.3} is below 1.0"),
            suggestion: None,
        });
    }

    let per_site = config.neighbor.sectors_per_site;
    if per_site > 12 {
        warnings.push(ValidationWarning {
            field: "neighbor.sectors_per_site".to_string(),
            message: format!(
                "neighbor.sectors_per_site = {per_site} is unusually high (typical 1-6)"
            ),
            suggestion: None,
        });
    }

    // Sphere radius: anything between polar and equatorial radius is fine
    let radius = config.neighbor.earth_radius_km;
    if radius.is_finite() && radius > 0.0 && !(6350.0..=6400.0).contains(&radius) {
        warnings.push(ValidationWarning {
            field: "neighbor.earth_radius_km".to_string(),
            message: format!(
                "neighbor.earth_radius_km = {radius:.1} is outside Earth's range (6350-6400 km)"
            ),
            suggestion: None,
        });
    }

    if let Some(p) = config.analysis.success_threshold_percent {
        if p == 0 {
            warnings.push(ValidationWarning {
                field: "analysis.success_threshold_percent".to_string(),
                message: "analysis.success_threshold_percent = 0 disables every tilt change"
                    .to_string(),
                suggestion: None,
            });
        }
    }

    if config.io.output_path.is_dir() {
        errors.push(format!(
            "io.output_path = {} is a directory",
            config.io.output_path.display()
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("azimuth", "azimuth"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("azimuth_tolerence_deg", "azimuth_tolerance_deg"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [neighbor]
            sectors_per_site = 3
            [io]
            output_path = "out.csv"
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"neighbor".to_string()));
        assert!(keys.contains(&"neighbor.sectors_per_site".to_string()));
        assert!(keys.contains(&"io.output_path".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[neighbor]
azimuth_tolerence_deg = 45.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("azimuth_tolerence_deg"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("neighbor.azimuth_tolerance_deg")
        );
        assert!(warnings[0].to_string().contains("did you mean"));
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[analysis]
success_threshold_percent = 95

[neighbor]
sectors_per_site = 3
azimuth_tolerance_deg = 60.0
earth_radius_km = 6371.0

[advisor]
overshoot_margin = 1.1
undershoot_ratio = 0.25

[io]
output_path = "output.csv"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys("[plotting]\ncolour = \"red\"\n");
        assert!(warnings.iter().any(|w| w.field == "plotting"));
        assert!(warnings.iter().any(|w| w.field == "plotting.colour"));
    }

    #[test]
    fn test_malformed_toml_yields_no_warnings() {
        assert!(validate_unknown_keys("[neighbor").is_empty());
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_physical_range_defaults_clean() {
        let (errors, warnings) = validate_physical_ranges(&AnalysisConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {:?}", errors);
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {:?}", warnings);
    }

    #[test]
    fn test_physical_range_radius_suspicious() {
        let mut config = AnalysisConfig::default();
        config.neighbor.earth_radius_km = 6378137.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "neighbor.earth_radius_km"));
    }

    #[test]
    fn test_physical_range_many_sectors_per_site() {
        let mut config = AnalysisConfig::default();
        config.neighbor.sectors_per_site = 24;
        let (_, warnings) = validate_physical_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "neighbor.sectors_per_site"));
    }

    #[test]
    fn test_physical_range_output_is_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AnalysisConfig::default();
        config.io.output_path = dir.path().to_path_buf();
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("io.output_path")));
    }
}
