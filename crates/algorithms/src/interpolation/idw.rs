//! Inverse Distance Weighting (IDW) resolution
//!
//! Estimates target values as a weighted average of nearby source points,
//! where weights are inversely proportional to distance raised to a power
//! parameter.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use georegrid_core::{Error, IdwMapping, ObservationPoint, Result};

use super::Interpolator;
use crate::maybe_rayon::try_par_map;

/// Distances (km) at or below this are treated as co-located
pub const MIN_WEIGHT_DISTANCE: f64 = 1e-6;

/// Weight given to a co-located source
pub const COLOCATED_WEIGHT: f64 = 1e6;

/// IDW weight for a source at `distance_km`.
///
/// ```text
/// w = 1 / d^p        for d > 1e-6
/// w = 1e6            otherwise
/// ```
#[inline]
pub fn idw_weight(distance_km: f64, power: f64) -> f64 {
    if distance_km > MIN_WEIGHT_DISTANCE {
        1.0 / distance_km.powf(power)
    } else {
        COLOCATED_WEIGHT
    }
}

impl<'a> Interpolator<'a> {
    /// Blend mapped source values onto each target.
    ///
    /// # Algorithm
    ///
    /// For every candidate that resolves to a source point at the target's
    /// time step:
    ///
    /// ```text
    /// z = Σ(wi * zi) / Σ(wi)
    /// ```
    ///
    /// computed component-wise over the value vector. Fallback mappings
    /// copy their single source like Nearest Neighbor. Targets with no
    /// resolvable candidate are skipped; the call fails only when every
    /// target is skipped.
    pub fn interpolate_idw(
        &self,
        targets: &[ObservationPoint],
        mappings: &[IdwMapping],
    ) -> Result<Vec<ObservationPoint>> {
        let resolved = try_par_map(mappings.len(), |i| self.resolve_idw(targets, &mappings[i]))?;

        let result: Vec<ObservationPoint> = resolved.into_iter().flatten().collect();
        if result.is_empty() {
            return Err(Error::Lookup("No points interpolated in IDW mode".into()));
        }
        Ok(result)
    }

    fn resolve_idw(
        &self,
        targets: &[ObservationPoint],
        mapping: &IdwMapping,
    ) -> Result<Option<ObservationPoint>> {
        let target = self.target_at(targets, mapping.target_index)?;

        if mapping.is_fallback {
            let only = mapping.fallback_source().ok_or_else(|| {
                Error::InvalidMapping(format!(
                    "fallback mapping for target {} must hold exactly one source, found {}",
                    mapping.target_index,
                    mapping.candidates.len()
                ))
            })?;
            return Ok(self.copy_from_source(target, &only.source));
        }

        let power = self.config.power;
        let mut sum_wz = vec![0.0; self.value_len];
        let mut sum_w = 0.0;
        let mut used = 0usize;

        for candidate in &mapping.candidates {
            let Some(src) = self.find_source(&candidate.source, target.time_step) else {
                self.reporter.warn(&format!(
                    "No source point found for ({}, {}, {}) in IDW interpolation",
                    candidate.source.longitude, candidate.source.latitude, target.time_step
                ));
                continue;
            };

            let w = idw_weight(candidate.distance_km, power);
            sum_w += w;
            for (acc, &v) in sum_wz.iter_mut().zip(&src.values) {
                *acc += w * v;
            }
            used += 1;
        }

        if used == 0 {
            self.reporter.warn(&format!(
                "No valid source points for target ({}, {}, {}) in IDW interpolation",
                target.coord.longitude, target.coord.latitude, target.time_step
            ));
            return Ok(None);
        }

        for acc in &mut sum_wz {
            *acc /= sum_w;
        }

        Ok(Some(ObservationPoint {
            coord: target.coord,
            time_step: target.time_step,
            values: sum_wz,
        }))
    }
}
