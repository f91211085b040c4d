//! Nearest Neighbor resolution
//!
//! Each target receives the values of the source point its mapping names,
//! for the target's own time step.

use georegrid_core::{Error, NnMapping, ObservationPoint, Result};

use super::Interpolator;
use crate::maybe_rayon::try_par_map;

impl<'a> Interpolator<'a> {
    /// Copy mapped source values onto each target.
    ///
    /// Output keeps mapping order minus skipped targets. Fails when no
    /// target could be resolved.
    pub fn interpolate_nearest(
        &self,
        targets: &[ObservationPoint],
        mappings: &[NnMapping],
    ) -> Result<Vec<ObservationPoint>> {
        let resolved = try_par_map(mappings.len(), |i| {
            let mapping = &mappings[i];
            let target = self.target_at(targets, mapping.target_index)?;
            Ok(self.copy_from_source(target, &mapping.source))
        })?;

        let result: Vec<ObservationPoint> = resolved.into_iter().flatten().collect();
        if result.is_empty() {
            return Err(Error::Lookup("No points interpolated in NN mode".into()));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::SpatialMatcher;
    use georegrid_core::{CollectingReporter, Coordinate, ErrorKind, RegridConfig};

    fn source() -> Vec<ObservationPoint> {
        vec![
            ObservationPoint::new(87.25, 46.25, 2020, vec![1.0, 2.0, 3.0]),
            ObservationPoint::new(86.25, 46.25, 2020, vec![4.0, 5.0, 6.0]),
            ObservationPoint::new(87.25, 46.25, 2021, vec![7.0, 8.0, 9.0]),
        ]
    }

    fn mapping(index: usize, target: Coordinate, source: Coordinate) -> NnMapping {
        NnMapping {
            target_index: index,
            target,
            source,
            distance_km: 0.0,
        }
    }

    #[test]
    fn test_copies_values_for_time_step() {
        let source = source();
        let cfg = RegridConfig::default();
        let interp = Interpolator::new(&source, &cfg).unwrap();
        let targets = vec![
            ObservationPoint::new(88.0, 46.0, 2020, vec![]),
            ObservationPoint::new(88.0, 46.0, 2021, vec![]),
        ];
        let src = Coordinate::new(87.25, 46.25);
        let mappings = vec![
            mapping(0, targets[0].coord, src),
            mapping(1, targets[1].coord, src),
        ];

        let out = interp.interpolate_nearest(&targets, &mappings).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(out[1].values, vec![7.0, 8.0, 9.0]);
        // Location and time step come from the target
        assert_eq!(out[1].coord, Coordinate::new(88.0, 46.0));
        assert_eq!(out[1].time_step, 2021);
    }

    #[test]
    fn test_colocated_target_reproduces_source_exactly() {
        let source = vec![
            ObservationPoint::new(10.0, 10.0, 1999, vec![0.1, 1.0 / 3.0, 1e-12]),
            ObservationPoint::new(11.0, 10.0, 1999, vec![9.0, 9.0, 9.0]),
        ];
        let targets = vec![ObservationPoint::new(10.0, 10.0, 1999, vec![])];
        let cfg = RegridConfig::default();
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let mappings = matcher.find_nearest_neighbors(&targets).unwrap();
        let interp = Interpolator::new(&source, &cfg).unwrap();

        let out = interp.interpolate_nearest(&targets, &mappings).unwrap();
        assert_eq!(out[0].values, source[0].values);
    }

    #[test]
    fn test_missing_time_step_is_skipped() {
        let source = source();
        let cfg = RegridConfig::default();
        let reporter = CollectingReporter::new();
        let interp = Interpolator::new(&source, &cfg).unwrap().with_reporter(&reporter);
        let targets = vec![
            ObservationPoint::new(88.0, 46.0, 2020, vec![]),
            ObservationPoint::new(88.0, 46.0, 1990, vec![]),
        ];
        let src = Coordinate::new(87.25, 46.25);
        let mappings = vec![
            mapping(0, targets[0].coord, src),
            mapping(1, targets[1].coord, src),
        ];

        let out = interp.interpolate_nearest(&targets, &mappings).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].time_step, 2020);
        assert_eq!(reporter.warnings().len(), 1);
        assert!(reporter.warnings()[0].contains("1990"));
    }

    #[test]
    fn test_all_skipped_is_lookup_error() {
        let source = source();
        let cfg = RegridConfig::default();
        let interp = Interpolator::new(&source, &cfg).unwrap();
        let targets = vec![ObservationPoint::new(88.0, 46.0, 1990, vec![])];
        let mappings = vec![mapping(0, targets[0].coord, Coordinate::new(87.25, 46.25))];

        let err = interp.interpolate_nearest(&targets, &mappings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_bad_target_index() {
        let source = source();
        let cfg = RegridConfig::default();
        let interp = Interpolator::new(&source, &cfg).unwrap();
        let targets = vec![ObservationPoint::new(88.0, 46.0, 2020, vec![])];
        let mappings = vec![mapping(3, targets[0].coord, Coordinate::new(87.25, 46.25))];

        let err = interp.interpolate_nearest(&targets, &mappings).unwrap_err();
        assert!(matches!(err, Error::InvalidMapping(_)));
    }
}
