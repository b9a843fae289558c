//! Success-ratio threshold supplied by the operator

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThresholdError {
    #[error("success threshold must be between 0 and 100 (got {0})")]
    OutOfRange(u32),

    #[error("'{0}' is not a percentage value between 0 and 100")]
    Unparseable(String),
}

/// Call-setup success ratio, in whole percent, below which a sector is a
/// candidate for tilt adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SuccessThreshold(u8);

impl SuccessThreshold {
    pub const MAX: u8 = 100;

    pub fn new(percent: u32) -> Result<Self, ThresholdError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= Self::MAX)
            .map(Self)
            .ok_or(ThresholdError::OutOfRange(percent))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Parse operator input such as `75%`, `%5` or `55`.
    ///
    /// One or two digits, or exactly `100`, with an optional leading and an
    /// optional trailing `%`. Anything else (including surrounding words or
    /// a sign) is rejected.
    pub fn parse_input(input: &str) -> Result<Self, ThresholdError> {
        let input = input.trim_end_matches(['\r', '\n']);
        let digits = threshold_patterns()
            .iter()
            .find_map(|re| re.captures(input))
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| ThresholdError::Unparseable(input.to_string()))?;

        let value: u32 = digits
            .as_str()
            .parse()
            .map_err(|_| ThresholdError::Unparseable(input.to_string()))?;
        Self::new(value)
    }
}

fn threshold_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^%?(\d\d?)%?$").expect("static threshold pattern"),
            Regex::new(r"^%?(100)%?$").expect("static threshold pattern"),
        ]
    })
}

impl FromStr for SuccessThreshold {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_input(s)
    }
}

impl TryFrom<u32> for SuccessThreshold {
    type Error = ThresholdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SuccessThreshold> for u32 {
    fn from(t: SuccessThreshold) -> Self {
        u32::from(t.0)
    }
}

impl std::fmt::Display for SuccessThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_percent_forms() {
        assert_eq!(SuccessThreshold::parse_input("75%").unwrap().percent(), 75);
        assert_eq!(SuccessThreshold::parse_input("%5").unwrap().percent(), 5);
        assert_eq!(SuccessThreshold::parse_input("55").unwrap().percent(), 55);
        assert_eq!(SuccessThreshold::parse_input("%100%").unwrap().percent(), 100);
        assert_eq!(SuccessThreshold::parse_input("0").unwrap().percent(), 0);
        assert_eq!(SuccessThreshold::parse_input("95\n").unwrap().percent(), 95);
    }

    #[test]
    fn test_rejects_free_text() {
        for bad in ["95percent", "Threshold is 95%", "-95", "101", "", "%", " 95", "9.5"] {
            assert!(
                SuccessThreshold::parse_input(bad).is_err(),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_new_enforces_range() {
        assert!(SuccessThreshold::new(100).is_ok());
        assert_eq!(
            SuccessThreshold::new(101),
            Err(ThresholdError::OutOfRange(101))
        );
        assert_eq!(
            SuccessThreshold::new(300),
            Err(ThresholdError::OutOfRange(300))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SuccessThreshold::new(95).unwrap().to_string(), "95%");
    }
}
