//! # georegrid algorithms
//!
//! Regridding of scattered geospatial time series onto a new set of points.
//!
//! ## Components
//!
//! - **matcher**: nearest-neighbor and radius-bounded neighbor search
//! - **interpolation**: Nearest Neighbor copy and IDW blending
//! - **regrid**: the read → match → interpolate → write pipeline
//! - **report**: `tracing`-backed reporter
//!
//! ```no_run
//! use georegrid_algorithms::prelude::*;
//!
//! let source = vec![
//!     ObservationPoint::new(87.25, 46.25, 2020, vec![1.0]),
//!     ObservationPoint::new(86.25, 46.25, 2020, vec![2.0]),
//! ];
//! let target = vec![ObservationPoint::new(88.0, 46.0, 2020, vec![])];
//! let config = RegridConfig::builder().radius(150.0).min_points(2).build()?;
//!
//! let out = regrid(&source, &target, &config, &NoopReporter)?;
//! println!("{:?}", out.points[0].values);
//! # Ok::<(), georegrid_core::Error>(())
//! ```

pub mod interpolation;
pub mod matcher;
mod maybe_rayon;
pub mod regrid;
pub mod report;

pub use interpolation::Interpolator;
pub use matcher::SpatialMatcher;
pub use maybe_rayon::{num_threads, set_num_threads};
pub use regrid::{regrid, validate_headers, RegridOutput, RegridSummary, Regridder};
pub use report::TracingReporter;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::Interpolator;
    pub use crate::matcher::SpatialMatcher;
    pub use crate::regrid::{regrid, RegridOutput, RegridSummary, Regridder};
    pub use crate::report::TracingReporter;
    pub use georegrid_core::prelude::*;
}
