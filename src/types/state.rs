//! Sector classification produced by the tilt advisor

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::SectorError;

/// Outcome of one advisory pass for a sector.
///
/// Every sector starts as `NoAction`; the advisor moves it into exactly one
/// other state when it detects a coverage problem.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub enum SectorState {
    #[default]
    NoAction,
    /// Overshooting, downtilted by a full step
    OvershooterFull,
    /// Overshooting, downtilted by less than a full step (clamped at max)
    OvershooterPartial,
    /// Overshooting but the tilt is already beyond the adjustable range
    TiltCannotIncrease,
    /// Undershooting, uptilted by a full step
    UndershooterFull,
    /// Undershooting, uptilted by less than a full step (clamped at zero)
    UndershooterPartial,
    /// Undershooting but the tilt is already zero
    TiltCannotDecrease,
}

impl SectorState {
    pub const ALL: [SectorState; 7] = [
        SectorState::NoAction,
        SectorState::OvershooterFull,
        SectorState::OvershooterPartial,
        SectorState::TiltCannotIncrease,
        SectorState::UndershooterFull,
        SectorState::UndershooterPartial,
        SectorState::TiltCannotDecrease,
    ];

    /// Human-readable label, as written to the output file.
    pub fn label(&self) -> &'static str {
        match self {
            SectorState::NoAction => "No action",
            SectorState::OvershooterFull => "Overshooter, cell downtilted 20 degrees",
            SectorState::OvershooterPartial => "Overshooter, cell downtilted less than 20 degrees",
            SectorState::TiltCannotIncrease => "Tilt value cannot be increased further",
            SectorState::UndershooterFull => "Undershooter, cell uptilted 20 degrees",
            SectorState::UndershooterPartial => "Undershooter, cell uptilted less than 20 degrees",
            SectorState::TiltCannotDecrease => "Tilt value cannot be decreased further",
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            SectorState::NoAction => "NoAction",
            SectorState::OvershooterFull => "OvershooterFull",
            SectorState::OvershooterPartial => "OvershooterPartial",
            SectorState::TiltCannotIncrease => "TiltCannotIncrease",
            SectorState::UndershooterFull => "UndershooterFull",
            SectorState::UndershooterPartial => "UndershooterPartial",
            SectorState::TiltCannotDecrease => "TiltCannotDecrease",
        }
    }

    pub fn is_overshooter(&self) -> bool {
        matches!(
            self,
            SectorState::OvershooterFull
                | SectorState::OvershooterPartial
                | SectorState::TiltCannotIncrease
        )
    }

    pub fn is_undershooter(&self) -> bool {
        matches!(
            self,
            SectorState::UndershooterFull
                | SectorState::UndershooterPartial
                | SectorState::TiltCannotDecrease
        )
    }
}

impl std::fmt::Display for SectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for SectorState {
    type Err = SectorError;

    /// Accepts either the output label or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SectorState::ALL
            .iter()
            .copied()
            .find(|state| state.label() == s || state.variant_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SectorError::InvalidState(s.to_string()))
    }
}
