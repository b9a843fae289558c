//! Sector entity: one antenna sector with its radio measurements
//!
//! A `Sector` is built once from a complete set of fields and validated as a
//! whole, so an instance with successes above attempts (or any other out of
//! range value) can never exist. Only `tilt` and `state` change afterwards,
//! and only through the tilt advisor.

use serde::Serialize;
use thiserror::Error;

use super::SectorState;

// ============================================================================
// Tilt / Measurement Bounds
// ============================================================================

/// Lowest encodable tilt (antenna fully uptilted)
pub const TILT_MIN: u8 = 0;
/// Highest encodable tilt (antenna fully downtilted)
pub const TILT_MAX: u8 = 100;
/// Size of one adjustment step
pub const TILT_STEP: u8 = 20;
/// Upper bound of the timing advance measurement
pub const TIMING_ADVANCE_MAX: f64 = 100.0;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SectorError {
    #[error("attempts value cannot be less than 0 (got {0})")]
    InvalidAttempts(i64),

    #[error("successes value ({successes}) cannot be greater than attempts ({attempts})")]
    SuccessExceedsAttempts { successes: i64, attempts: i64 },

    #[error("successes value cannot be less than 0 (got {0})")]
    InvalidSuccesses(i64),

    #[error("timing advance cannot be more than 100 (got {0})")]
    TimingAdvanceTooHigh(f64),

    #[error("timing advance cannot be less than 0 (got {0})")]
    TimingAdvanceTooLow(f64),

    #[error("tilt cannot be more than 100 (got {0})")]
    TiltTooHigh(i64),

    #[error("tilt cannot be less than 0 (got {0})")]
    TiltTooLow(i64),

    #[error("'{0}' is not a defined sector state")]
    InvalidState(String),

    #[error("cannot parse {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

// ============================================================================
// Construction Inputs
// ============================================================================

/// Sector fields as read from a delimited file, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSector {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub azimuth: String,
    pub attempts: String,
    pub successes: String,
    pub timing_advance: String,
    pub tilt: String,
}

/// Numeric sector fields, not yet range-checked.
///
/// Counts and tilt are signed so that negative inputs reach validation and
/// are reported with their own error instead of failing to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorFields {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub azimuth: f64,
    pub attempts: i64,
    pub successes: i64,
    pub timing_advance: f64,
    pub tilt: i64,
}

impl TryFrom<&RawSector> for SectorFields {
    type Error = SectorError;

    fn try_from(raw: &RawSector) -> Result<Self, Self::Error> {
        Ok(Self {
            name: raw.name.trim().to_string(),
            latitude: parse_finite(&raw.latitude, "latitude")?,
            longitude: parse_finite(&raw.longitude, "longitude")?,
            azimuth: parse_finite(&raw.azimuth, "azimuth")?,
            attempts: parse_int(&raw.attempts, "attempts")?,
            successes: parse_int(&raw.successes, "successes")?,
            timing_advance: parse_measurement(&raw.timing_advance, "timing_advance")?,
            tilt: parse_int(&raw.tilt, "tilt")?,
        })
    }
}

fn parse_finite(s: &str, field: &'static str) -> Result<f64, SectorError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SectorError::InvalidNumber {
            field,
            value: s.to_string(),
        })
}

/// Like `parse_finite` but lets `±inf` through, so an infinite reading is
/// reported by the range checks in `Sector::new`.
fn parse_measurement(s: &str, field: &'static str) -> Result<f64, SectorError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| SectorError::InvalidNumber {
            field,
            value: s.to_string(),
        })
}

fn parse_int(s: &str, field: &'static str) -> Result<i64, SectorError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| SectorError::InvalidNumber {
            field,
            value: s.to_string(),
        })
}

// ============================================================================
// Sector
// ============================================================================

/// One antenna sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sector {
    name: String,
    latitude: f64,
    longitude: f64,
    azimuth: f64,
    attempts: u32,
    successes: u32,
    timing_advance: f64,
    tilt: u8,
    state: SectorState,
}

impl Sector {
    /// Validate all fields together and build the sector.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// attempts, successes against attempts, successes sign, timing
    /// advance, tilt.
    pub fn new(fields: SectorFields) -> Result<Self, SectorError> {
        let SectorFields {
            name,
            latitude,
            longitude,
            azimuth,
            attempts,
            successes,
            timing_advance,
            tilt,
        } = fields;

        if attempts < 0 {
            return Err(SectorError::InvalidAttempts(attempts));
        }
        if successes > attempts {
            return Err(SectorError::SuccessExceedsAttempts {
                successes,
                attempts,
            });
        }
        if successes < 0 {
            return Err(SectorError::InvalidSuccesses(successes));
        }
        if timing_advance > TIMING_ADVANCE_MAX {
            return Err(SectorError::TimingAdvanceTooHigh(timing_advance));
        }
        if timing_advance < 0.0 {
            return Err(SectorError::TimingAdvanceTooLow(timing_advance));
        }
        if tilt > i64::from(TILT_MAX) {
            return Err(SectorError::TiltTooHigh(tilt));
        }
        if tilt < i64::from(TILT_MIN) {
            return Err(SectorError::TiltTooLow(tilt));
        }

        let attempts =
            u32::try_from(attempts).map_err(|_| SectorError::InvalidNumber {
                field: "attempts",
                value: attempts.to_string(),
            })?;
        // successes <= attempts, so this always fits once attempts does
        let successes =
            u32::try_from(successes).map_err(|_| SectorError::InvalidNumber {
                field: "successes",
                value: successes.to_string(),
            })?;
        let tilt = u8::try_from(tilt).map_err(|_| SectorError::TiltTooHigh(tilt))?;

        Ok(Self {
            name,
            latitude,
            longitude,
            azimuth,
            attempts,
            successes,
            timing_advance,
            tilt,
            state: SectorState::NoAction,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Forward-pointing direction of the antenna, in degrees.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }

    pub fn timing_advance(&self) -> f64 {
        self.timing_advance
    }

    pub fn tilt(&self) -> u8 {
        self.tilt
    }

    pub fn state(&self) -> SectorState {
        self.state
    }

    /// Connection success rate as a percentage, `None` when there were no attempts.
    pub fn success_ratio(&self) -> Option<f64> {
        if self.attempts == 0 {
            return None;
        }
        Some(f64::from(self.successes) / f64::from(self.attempts) * 100.0)
    }

    /// Raise the antenna by one step, clamping at `TILT_MIN`. Returns the new tilt.
    pub fn uptilt(&mut self) -> u8 {
        self.tilt = self.tilt.saturating_sub(TILT_STEP);
        self.tilt
    }

    /// Lower the antenna by one step, clamping at `TILT_MAX`. Returns the new tilt.
    pub fn downtilt(&mut self) -> u8 {
        self.tilt = self.tilt.saturating_add(TILT_STEP).min(TILT_MAX);
        self.tilt
    }

    pub(crate) fn set_state(&mut self, state: SectorState) {
        self.state = state;
    }

    /// Compare everything except `state` and `azimuth`.
    ///
    /// Used to check advisor output against expected sectors, where the
    /// classification is asserted separately.
    pub fn same_measurements(&self, other: &Sector) -> bool {
        self.name == other.name
            && self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.attempts == other.attempts
            && self.successes == other.successes
            && self.timing_advance == other.timing_advance
            && self.tilt == other.tilt
    }
}

impl TryFrom<SectorFields> for Sector {
    type Error = SectorError;

    fn try_from(fields: SectorFields) -> Result<Self, Self::Error> {
        Sector::new(fields)
    }
}

impl TryFrom<&RawSector> for Sector {
    type Error = SectorError;

    fn try_from(raw: &RawSector) -> Result<Self, Self::Error> {
        Sector::new(SectorFields::try_from(raw)?)
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}'s state is {}, and its tilt value is {}",
            self.name, self.state, self.tilt
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
