//! # georegrid core
//!
//! Core types, configuration and I/O for the georegrid library.
//!
//! This crate provides:
//! - `Coordinate`, `ObservationPoint`, `Dataset`: the data model
//! - `RegridConfig`: validated run parameters
//! - Distance metrics (haversine and planar) and degree/km conversion
//! - Mapping records shared by the matcher, interpolator and writers
//! - The `Reporter` seam for warnings and errors
//! - Whitespace-delimited text I/O

pub mod config;
pub mod distance;
pub mod error;
pub mod io;
pub mod mapping;
pub mod point;
pub mod report;

pub use config::{DataLayout, InterpolationMethod, RegridConfig, RegridConfigBuilder};
pub use distance::{
    degrees_from_km, distance, km_from_euclidean, normalize_longitude, DistanceMetric,
};
pub use error::{Error, ErrorKind, Result};
pub use mapping::{IdwMapping, NeighborCandidate, NnMapping};
pub use point::{Coordinate, Dataset, DatasetSummary, ObservationPoint};
pub use report::{CollectingReporter, NoopReporter, Reporter};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DataLayout, InterpolationMethod, RegridConfig};
    pub use crate::distance::DistanceMetric;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::mapping::{IdwMapping, NeighborCandidate, NnMapping};
    pub use crate::point::{Coordinate, Dataset, ObservationPoint};
    pub use crate::report::{NoopReporter, Reporter};
}
