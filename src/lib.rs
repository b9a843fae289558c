//! Sector Tilt: coverage-driven antenna tilt recommendations
//!
//! Finds, for every cellular sector, the nearest sector of another site that
//! lies in its pointing direction, and compares that distance with the
//! sector's timing advance to decide whether it overshoots or undershoots.
//!
//! ## Architecture
//!
//! - **Types**: validated `Sector` entity, `SectorState`, `SuccessThreshold`
//! - **Geodesy**: haversine distance and initial bearing
//! - **Neighbour Locator**: forward-cone nearest-neighbour search
//! - **Tilt Advisor**: overshoot/undershoot classification and tilt steps
//! - **Pipeline**: locator → advisor, producing an `AnalysisReport`
//! - **Acquisition / Report**: CSV in, CSV and JSON out

pub mod acquisition;
pub mod advisor;
pub mod config;
pub mod geodesy;
pub mod neighbor;
pub mod pipeline;
pub mod report;
pub mod types;

// Re-export analysis configuration
pub use config::AnalysisConfig;

// Re-export commonly used types
pub use types::{
    RawSector, Sector, SectorError, SectorFields, SectorState, SuccessThreshold, ThresholdError,
};

// Re-export core components
pub use advisor::{AdvisorySummary, CoverageSignal, TiltAdvisor, TiltChange};
pub use neighbor::{ForwardNeighbor, NeighborDistances, NeighborLocator};
pub use pipeline::{run_analysis, AnalysisReport};
