//! Resolution of mapping records into interpolated values
//!
//! The [`Interpolator`] takes mappings produced by the
//! [`SpatialMatcher`](crate::matcher::SpatialMatcher) and looks up the
//! source values they point at:
//! - Nearest Neighbor: copy the mapped source's values verbatim
//! - IDW: weighted average of the mapped sources, `w = 1 / d^power`
//!
//! A source point is resolved by location (within 1e-6 degrees) *and* the
//! target's time step. Targets that resolve to nothing are skipped with a
//! warning; a run where every target is skipped is an error.

mod idw;
mod nearest;

pub use idw::{idw_weight, COLOCATED_WEIGHT, MIN_WEIGHT_DISTANCE};

use georegrid_core::point::validate_uniform;
use georegrid_core::{
    Coordinate, Error, IdwMapping, InterpolationMethod, NnMapping, NoopReporter,
    ObservationPoint, RegridConfig, Reporter, Result,
};

/// Resolves mappings against a borrowed source set.
///
/// Borrows the source points and config for one regrid call.
pub struct Interpolator<'a> {
    source: &'a [ObservationPoint],
    config: &'a RegridConfig,
    reporter: &'a dyn Reporter,
    value_len: usize,
}

impl<'a> Interpolator<'a> {
    /// Fails with a lookup error on an empty source set and a validation
    /// error when source value vectors differ in length.
    pub fn new(source: &'a [ObservationPoint], config: &'a RegridConfig) -> Result<Self> {
        if source.is_empty() {
            return Err(Error::Lookup("Source point list is empty".into()));
        }
        let value_len = validate_uniform(source)?;
        Ok(Self {
            source,
            config,
            reporter: &NoopReporter,
            value_len,
        })
    }

    /// Send warnings to `reporter` instead of discarding them
    pub fn with_reporter(mut self, reporter: &'a dyn Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Values per source point
    pub fn value_len(&self) -> usize {
        self.value_len
    }

    /// Resolve with the configured method. Only the mapping list for that
    /// method is read.
    pub fn interpolate(
        &self,
        targets: &[ObservationPoint],
        nn_mappings: &[NnMapping],
        idw_mappings: &[IdwMapping],
    ) -> Result<Vec<ObservationPoint>> {
        match self.config.method {
            InterpolationMethod::NearestNeighbor => self.interpolate_nearest(targets, nn_mappings),
            InterpolationMethod::InverseDistanceWeighted => {
                self.interpolate_idw(targets, idw_mappings)
            }
        }
    }

    /// Whether a fallback mapping resolves to a source row, i.e. whether
    /// its target produces output
    pub(crate) fn resolves_fallback(
        &self,
        targets: &[ObservationPoint],
        mapping: &IdwMapping,
    ) -> bool {
        match (mapping.fallback_source(), targets.get(mapping.target_index)) {
            (Some(only), Some(target)) => self.find_source(&only.source, target.time_step).is_some(),
            _ => false,
        }
    }

    /// First source point at `coord` carrying `time_step`
    fn find_source(&self, coord: &Coordinate, time_step: i32) -> Option<&'a ObservationPoint> {
        self.source.iter().find(|p| p.matches(coord, time_step))
    }

    fn target_at<'t>(
        &self,
        targets: &'t [ObservationPoint],
        index: usize,
    ) -> Result<&'t ObservationPoint> {
        targets.get(index).ok_or_else(|| {
            Error::InvalidMapping(format!(
                "target index {} out of range for {} targets",
                index,
                targets.len()
            ))
        })
    }

    /// Copy a source's values onto the target, or warn and return `None`
    fn copy_from_source(
        &self,
        target: &ObservationPoint,
        source: &Coordinate,
    ) -> Option<ObservationPoint> {
        match self.find_source(source, target.time_step) {
            Some(src) => Some(ObservationPoint {
                coord: target.coord,
                time_step: target.time_step,
                values: src.values.clone(),
            }),
            None => {
                self.reporter.warn(&format!(
                    "No source point found for target ({}, {}, {}) at source ({}, {})",
                    target.coord.longitude,
                    target.coord.latitude,
                    target.time_step,
                    source.longitude,
                    source.latitude
                ));
                None
            }
        }
    }
}
