//! Tilt Advisor
//!
//! Classifies each sector as overshooting, undershooting or fine, and applies
//! one bounded tilt step accordingly.
//!
//! A sector is only considered when its call-setup success ratio is below the
//! operator threshold. Its timing advance (a proxy for how far its users are)
//! is then compared against the distance to its forward neighbour:
//!
//! - `TA × overshoot_margin > distance` → overshooter, downtilt
//! - otherwise `TA × undershoot_ratio < distance` → undershooter, uptilt
//! - otherwise no action
//!
//! The overshoot test is evaluated first; only one branch fires per pass.
//! Running the advisor again over its own output moves tilt further.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::AdvisorConfig;
use crate::neighbor::NeighborDistances;
use crate::types::{Sector, SectorState, SuccessThreshold, TILT_MAX, TILT_STEP};

/// Highest tilt that still takes a full downtilt step
const FULL_DOWNTILT_LIMIT: u8 = TILT_MAX - TILT_STEP;

// ============================================================================
// Result Types
// ============================================================================

/// Coverage problem inferred for one sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoverageSignal {
    Overshoot,
    Undershoot,
    None,
}

/// One applied (or refused) tilt adjustment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltChange {
    pub sector: String,
    pub signal: CoverageSignal,
    pub state: SectorState,
    pub previous_tilt: u8,
    pub new_tilt: u8,
    pub neighbor_distance_km: f64,
}

/// Outcome of one advisory pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvisorySummary {
    /// Sectors that had a neighbour distance and were evaluated
    pub evaluated: usize,
    /// Sectors absent from the neighbour mapping (left untouched)
    pub skipped: usize,
    /// Evaluated sectors with no attempts, so no success ratio
    pub without_attempts: usize,
    /// Final state counts across evaluated sectors
    pub state_counts: BTreeMap<SectorState, usize>,
    /// Every sector whose state moved away from `NoAction`
    pub changes: Vec<TiltChange>,
}

impl AdvisorySummary {
    pub fn count(&self, state: SectorState) -> usize {
        self.state_counts.get(&state).copied().unwrap_or(0)
    }
}

// ============================================================================
// Advisor
// ============================================================================

#[derive(Debug, Clone)]
pub struct TiltAdvisor {
    threshold: SuccessThreshold,
    overshoot_margin: f64,
    undershoot_ratio: f64,
}

impl TiltAdvisor {
    pub fn new(threshold: SuccessThreshold, config: &AdvisorConfig) -> Self {
        Self {
            threshold,
            overshoot_margin: config.overshoot_margin,
            undershoot_ratio: config.undershoot_ratio,
        }
    }

    /// Advisor with the default margins.
    pub fn with_threshold(threshold: SuccessThreshold) -> Self {
        Self::new(threshold, &AdvisorConfig::default())
    }

    /// Decide which coverage problem, if any, a sector shows.
    pub fn classify(&self, sector: &Sector, distance_km: f64) -> CoverageSignal {
        let Some(ratio) = sector.success_ratio() else {
            return CoverageSignal::None;
        };
        if ratio >= f64::from(self.threshold.percent()) {
            return CoverageSignal::None;
        }

        let ta = sector.timing_advance();
        if ta * self.overshoot_margin > distance_km {
            CoverageSignal::Overshoot
        } else if ta * self.undershoot_ratio < distance_km {
            CoverageSignal::Undershoot
        } else {
            CoverageSignal::None
        }
    }

    /// Classify one sector and apply the matching tilt step.
    ///
    /// Returns the change when the sector leaves `NoAction`.
    pub fn advise_sector(&self, sector: &mut Sector, distance_km: f64) -> Option<TiltChange> {
        let previous_tilt = sector.tilt();
        let signal = self.classify(sector, distance_km);

        let state = match signal {
            CoverageSignal::Overshoot => match previous_tilt {
                t if t <= FULL_DOWNTILT_LIMIT => {
                    sector.set_state(SectorState::OvershooterFull);
                    sector.downtilt();
                    SectorState::OvershooterFull
                }
                t if t <= TILT_MAX => {
                    sector.set_state(SectorState::OvershooterPartial);
                    sector.downtilt();
                    SectorState::OvershooterPartial
                }
                // unreachable while tilt stays within 0..=TILT_MAX
                _ => {
                    sector.set_state(SectorState::TiltCannotIncrease);
                    SectorState::TiltCannotIncrease
                }
            },
            CoverageSignal::Undershoot => match previous_tilt {
                t if t >= TILT_STEP => {
                    sector.set_state(SectorState::UndershooterFull);
                    sector.uptilt();
                    SectorState::UndershooterFull
                }
                t if t > 0 => {
                    sector.set_state(SectorState::UndershooterPartial);
                    sector.uptilt();
                    SectorState::UndershooterPartial
                }
                _ => {
                    sector.set_state(SectorState::TiltCannotDecrease);
                    SectorState::TiltCannotDecrease
                }
            },
            CoverageSignal::None => return None,
        };

        Some(TiltChange {
            sector: sector.name().to_string(),
            signal,
            state,
            previous_tilt,
            new_tilt: sector.tilt(),
            neighbor_distance_km: distance_km,
        })
    }

    /// Run one advisory pass over every sector.
    ///
    /// Sectors missing from `distances` are counted as skipped and not modified.
    pub fn advise(&self, sectors: &mut [Sector], distances: &NeighborDistances) -> AdvisorySummary {
        let mut summary = AdvisorySummary::default();

        for sector in sectors.iter_mut() {
            let Some(distance_km) = distances.distance_km(sector.name()) else {
                debug!(sector = %sector.name(), "No neighbour distance, skipping");
                summary.skipped += 1;
                continue;
            };

            summary.evaluated += 1;
            if sector.attempts() == 0 {
                debug!(sector = %sector.name(), "No connection attempts, success ratio undefined");
                summary.without_attempts += 1;
            }

            if let Some(change) = self.advise_sector(sector, distance_km) {
                info!(
                    sector = %change.sector,
                    state = %change.state,
                    from = change.previous_tilt,
                    to = change.new_tilt,
                    distance_km = change.neighbor_distance_km,
                    "Tilt recommendation"
                );
                summary.changes.push(change);
            }

            *summary.state_counts.entry(sector.state()).or_insert(0) += 1;
        }

        info!(
            evaluated = summary.evaluated,
            skipped = summary.skipped,
            changed = summary.changes.len(),
            threshold = %self.threshold,
            "Advisory pass complete"
        );
        summary
    }
}

// ============================================================================
// Tests
// ============================================================================
