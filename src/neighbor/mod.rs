//! Forward neighbour search
//!
//! For every sector, finds the nearest other sector that sits inside the
//! sector's forward azimuth cone. The result feeds the tilt advisor, which
//! compares the sector's timing advance against that distance.
//!
//! ## Ranking
//!
//! Each source ranks the whole set by great-circle distance from itself:
//! the source at position 0, then everyone else nearest first (ties keep
//! input order). The first `sectors_per_site` positions are skipped, since
//! they are the source and its co-sited siblings pointing elsewhere. From the
//! next position on, the first candidate whose bearing lies within
//! `azimuth_tolerance_deg` of the source azimuth is accepted. No match gives
//! a distance of 0.
//!
//! Pairwise distances are computed once into a symmetric matrix, which is
//! quadratic in the sector count; inventories are small enough for that.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::NeighborConfig;
use crate::geodesy::{angular_difference, central_angle, initial_bearing};
use crate::types::Sector;

// ============================================================================
// Result Types
// ============================================================================

/// The neighbour accepted for one source sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardNeighbor {
    /// Name of the accepted neighbour
    pub name: String,
    /// Great-circle distance from the source (km)
    pub distance_km: f64,
    /// Bearing from the source to the neighbour (degrees)
    pub bearing_deg: f64,
    /// Position in the source's distance ranking (0 = the source itself)
    pub rank: usize,
}

/// Sector name → distance to its forward neighbour.
///
/// A sector without a qualifying neighbour maps to `0.0`; a sector that was
/// never located is absent, and the advisor leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NeighborDistances {
    distances: HashMap<String, f64>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    neighbors: HashMap<String, ForwardNeighbor>,
}

impl NeighborDistances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a distance for a sector, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, distance_km: f64) {
        self.distances.insert(name.into(), distance_km);
    }

    /// Distance for `name`, or `None` if the sector is not in the mapping.
    pub fn distance_km(&self, name: &str) -> Option<f64> {
        self.distances.get(name).copied()
    }

    /// The accepted neighbour for `name`, if the locator found one.
    pub fn neighbor(&self, name: &str) -> Option<&ForwardNeighbor> {
        self.neighbors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.distances.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Number of sectors with a qualifying forward neighbour.
    pub fn matched(&self) -> usize {
        self.neighbors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.distances.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for NeighborDistances {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (name, d) in iter {
            out.insert(name, d);
        }
        out
    }
}

// ============================================================================
// Distance Matrix
// ============================================================================

/// Symmetric matrix of central angles (radians) between every pair of sectors.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    angles: Vec<f64>,
}

impl DistanceMatrix {
    pub fn build(sectors: &[Sector]) -> Self {
        let n = sectors.len();
        let mut angles = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let a = central_angle(
                    sectors[i].latitude(),
                    sectors[i].longitude(),
                    sectors[j].latitude(),
                    sectors[j].longitude(),
                );
                angles[i * n + j] = a;
                angles[j * n + i] = a;
            }
        }
        Self { n, angles }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Central angle between sectors `i` and `j`, in radians.
    #[inline]
    pub fn angle(&self, i: usize, j: usize) -> f64 {
        self.angles[i * self.n + j]
    }

    /// All sector indices ordered for `source`: the source first, then
    /// ascending distance, ties in input order.
    pub fn ranked_from(&self, source: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n).collect();
        order.sort_by(|&a, &b| {
            (a != source)
                .cmp(&(b != source))
                .then_with(|| self.angle(source, a).total_cmp(&self.angle(source, b)))
                .then_with(|| a.cmp(&b))
        });
        order
    }
}

// ============================================================================
// Locator
// ============================================================================

/// Finds each sector's nearest in-beam neighbour.
#[derive(Debug, Clone)]
pub struct NeighborLocator {
    sectors_per_site: usize,
    azimuth_tolerance_deg: f64,
    earth_radius_km: f64,
}

impl Default for NeighborLocator {
    fn default() -> Self {
        Self::new(&NeighborConfig::default())
    }
}

impl NeighborLocator {
    pub fn new(config: &NeighborConfig) -> Self {
        Self {
            sectors_per_site: config.sectors_per_site,
            azimuth_tolerance_deg: config.azimuth_tolerance_deg,
            earth_radius_km: config.earth_radius_km,
        }
    }

    pub fn with_sectors_per_site(mut self, sectors_per_site: usize) -> Self {
        self.sectors_per_site = sectors_per_site;
        self
    }

    pub fn with_azimuth_tolerance(mut self, degrees: f64) -> Self {
        self.azimuth_tolerance_deg = degrees;
        self
    }

    pub fn sectors_per_site(&self) -> usize {
        self.sectors_per_site
    }

    /// Locate the forward neighbour of every sector.
    pub fn locate(&self, sectors: &[Sector]) -> NeighborDistances {
        let matrix = DistanceMatrix::build(sectors);
        let mut out = NeighborDistances::new();

        for (idx, sector) in sectors.iter().enumerate() {
            if out.contains(sector.name()) {
                warn!(sector = %sector.name(), "Duplicate sector name, keeping first neighbour result");
                continue;
            }

            match self.forward_neighbor(sectors, &matrix, idx) {
                Some(found) => {
                    debug!(
                        sector = %sector.name(),
                        neighbor = %found.name,
                        distance_km = found.distance_km,
                        bearing_deg = found.bearing_deg,
                        rank = found.rank,
                        "Forward neighbour found"
                    );
                    out.insert(sector.name(), found.distance_km);
                    out.neighbors.insert(sector.name().to_string(), found);
                }
                None => {
                    debug!(sector = %sector.name(), "No neighbour inside forward cone");
                    out.insert(sector.name(), 0.0);
                }
            }
        }

        info!(
            sectors = sectors.len(),
            matched = out.matched(),
            "Neighbour search complete"
        );
        out
    }

    /// Scan `source`'s ranking past the co-sited positions and accept the
    /// first candidate inside the forward cone.
    fn forward_neighbor(
        &self,
        sectors: &[Sector],
        matrix: &DistanceMatrix,
        source: usize,
    ) -> Option<ForwardNeighbor> {
        let src = &sectors[source];

        matrix
            .ranked_from(source)
            .into_iter()
            .enumerate()
            .skip(self.sectors_per_site)
            .find_map(|(rank, candidate)| {
                let cand = &sectors[candidate];
                let bearing = initial_bearing(
                    src.latitude(),
                    src.longitude(),
                    cand.latitude(),
                    cand.longitude(),
                );
                if angular_difference(bearing, src.azimuth()) > self.azimuth_tolerance_deg {
                    return None;
                }
                Some(ForwardNeighbor {
                    name: cand.name().to_string(),
                    distance_km: matrix.angle(source, candidate) * self.earth_radius_km,
                    bearing_deg: bearing,
                    rank,
                })
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
