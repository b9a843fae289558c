//! Analysis Pipeline
//!
//! ```text
//! STAGE 1: Neighbour search  (read-only over every sector)
//! STAGE 2: Tilt advisory     (mutates tilt and state per sector)
//! STAGE 3: Report assembly
//! ```
//!
//! Stage 1 runs to completion before any sector is modified.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::advisor::{AdvisorySummary, TiltAdvisor, TiltChange};
use crate::config::AnalysisConfig;
use crate::neighbor::{ForwardNeighbor, NeighborLocator};
use crate::types::{Sector, SectorState, SuccessThreshold};

/// Per-sector neighbour search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorNeighbor {
    pub sector: String,
    /// Distance used by the advisor (0.0 when nothing qualified)
    pub distance_km: f64,
    pub neighbor: Option<ForwardNeighbor>,
}

/// Everything one analysis run decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub threshold: SuccessThreshold,
    pub sector_count: usize,
    /// Sectors with a qualifying forward neighbour
    pub matched: usize,
    pub neighbors: Vec<SectorNeighbor>,
    pub changes: Vec<TiltChange>,
    pub state_counts: BTreeMap<SectorState, usize>,
    pub sectors_without_attempts: usize,
}

impl AnalysisReport {
    fn assemble(
        sectors: &[Sector],
        threshold: SuccessThreshold,
        neighbors: Vec<SectorNeighbor>,
        matched: usize,
        summary: AdvisorySummary,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            threshold,
            sector_count: sectors.len(),
            matched,
            neighbors,
            changes: summary.changes,
            state_counts: summary.state_counts,
            sectors_without_attempts: summary.without_attempts,
        }
    }

    /// Number of sectors that ended in `state`.
    pub fn count(&self, state: SectorState) -> usize {
        self.state_counts.get(&state).copied().unwrap_or(0)
    }

    /// Sectors classified as overshooting, whether or not tilt could move.
    pub fn overshooters(&self) -> usize {
        self.count_where(SectorState::is_overshooter)
    }

    /// Sectors classified as undershooting, whether or not tilt could move.
    pub fn undershooters(&self) -> usize {
        self.count_where(SectorState::is_undershooter)
    }

    fn count_where(&self, pred: impl Fn(&SectorState) -> bool) -> usize {
        self.state_counts
            .iter()
            .filter(|(state, _)| pred(*state))
            .map(|(_, n)| n)
            .sum()
    }
}

/// Locate forward neighbours, then advise every sector in place.
pub fn run_analysis(
    sectors: &mut [Sector],
    threshold: SuccessThreshold,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let locator = NeighborLocator::new(&config.neighbor);
    let distances = locator.locate(sectors);

    // Report order follows input order, one entry per input row
    let neighbors: Vec<SectorNeighbor> = sectors
        .iter()
        .map(|s| SectorNeighbor {
            sector: s.name().to_string(),
            distance_km: distances.distance_km(s.name()).unwrap_or(0.0),
            neighbor: distances.neighbor(s.name()).cloned(),
        })
        .collect();

    let advisor = TiltAdvisor::new(threshold, &config.advisor);
    let summary = advisor.advise(sectors, &distances);

    let report = AnalysisReport::assemble(sectors, threshold, neighbors, distances.matched(), summary);
    info!(
        sectors = report.sector_count,
        matched = report.matched,
        changed = report.changes.len(),
        overshooters = report.overshooters(),
        undershooters = report.undershooters(),
        "Analysis complete"
    );
    report
}
