//! Spatial matching of target points to source points
//!
//! Two exhaustive searches over the source locations, both
//! O(|source| × |target|):
//!
//! - [`SpatialMatcher::nearest_neighbor`]: the single closest source.
//! - [`SpatialMatcher::radius_neighbors`]: every source within the search
//!   radius, sorted by distance and truncated to `max_points`, falling back
//!   to the nearest neighbor when fewer than `min_points` are in range.
//!
//! Every source point is a candidate, so a location repeated for several
//! time steps counts once per row. Ties are resolved by source order: the
//! nearest-neighbor scan keeps the first minimum it meets and the radius
//! search uses a stable sort.

use georegrid_core::distance::{degrees_from_km, DistanceMetric};
use georegrid_core::{
    Coordinate, Error, IdwMapping, NeighborCandidate, NnMapping, NoopReporter, ObservationPoint,
    RegridConfig, Reporter, Result,
};

use crate::maybe_rayon::try_par_map;

/// Read-only neighbor search over a borrowed source set.
///
/// Borrows the source points and config for one regrid call.
pub struct SpatialMatcher<'a> {
    source: &'a [ObservationPoint],
    config: &'a RegridConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> SpatialMatcher<'a> {
    /// Fails with a lookup error when `source` is empty.
    pub fn new(source: &'a [ObservationPoint], config: &'a RegridConfig) -> Result<Self> {
        if source.is_empty() {
            return Err(Error::Lookup("Source point list is empty".into()));
        }

        Ok(Self {
            source,
            config,
            reporter: &NoopReporter,
        })
    }

    /// Send warnings to `reporter` instead of discarding them
    pub fn with_reporter(mut self, reporter: &'a dyn Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn source(&self) -> &'a [ObservationPoint] {
        self.source
    }

    fn metric(&self) -> DistanceMetric {
        self.config.metric
    }

    /// Closest source location and its distance in the metric's native unit.
    ///
    /// Strict `<` keeps the first of several equidistant points. Non-finite
    /// distances never become the minimum.
    fn nearest_site(&self, target: &Coordinate) -> Result<(Coordinate, f64)> {
        let mut best: Option<(Coordinate, f64)> = None;
        for point in self.source {
            let d = self.metric().distance(*target, point.coord)?;
            if !d.is_finite() {
                continue;
            }
            match best {
                Some((_, min)) if d >= min => {}
                _ => best = Some((point.coord, d)),
            }
        }
        best.ok_or_else(|| {
            Error::Lookup(format!(
                "No valid source points found for target ({}, {})",
                target.longitude, target.latitude
            ))
        })
    }

    /// Single closest source location for one target
    pub fn nearest_neighbor(&self, target_index: usize, target: &Coordinate) -> Result<NnMapping> {
        let (source, native) = self.nearest_site(target)?;
        let distance_km = self.metric().to_km(native, target.latitude);

        if distance_km > self.config.radius {
            self.reporter.warn(&format!(
                "Nearest source point for target ({}, {}) is at distance {} km, exceeding radius {} km",
                target.longitude, target.latitude, distance_km, self.config.radius
            ));
        }

        Ok(NnMapping {
            target_index,
            target: *target,
            source,
            distance_km,
        })
    }

    /// Source locations within the radius of one target, for IDW.
    ///
    /// Candidates are sorted ascending by distance (stable) and truncated to
    /// `max_points`. With fewer than `min_points` in range the result is the
    /// single nearest neighbor, flagged `is_fallback`.
    pub fn radius_neighbors(&self, target_index: usize, target: &Coordinate) -> Result<IdwMapping> {
        target.validate()?;
        let metric = self.metric();
        let radius = match metric {
            DistanceMetric::Haversine => self.config.radius,
            DistanceMetric::Euclidean => degrees_from_km(self.config.radius, target.latitude)?,
        };

        let mut candidates = Vec::new();
        for point in self.source {
            let d = metric.distance(*target, point.coord)?;
            if d <= radius {
                candidates.push(NeighborCandidate::new(point.coord, d));
            }
        }

        let is_fallback = candidates.len() < self.config.min_points;
        if is_fallback {
            self.reporter.warn(&format!(
                "Only {} points found within radius {} km for target ({}, {}); \
                 falling back to Nearest Neighbor (min_points = {})",
                candidates.len(),
                self.config.radius,
                target.longitude,
                target.latitude,
                self.config.min_points
            ));
            let (source, native) = self.nearest_site(target)?;
            candidates = vec![NeighborCandidate::new(
                source,
                metric.to_km(native, target.latitude),
            )];
        } else {
            candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
            candidates.truncate(self.config.max_points);
            if metric == DistanceMetric::Euclidean {
                for c in &mut candidates {
                    c.distance_km = metric.to_km(c.distance_km, target.latitude);
                }
            }
        }

        if candidates.is_empty() {
            return Err(Error::Lookup(format!(
                "No valid source points found for target ({}, {})",
                target.longitude, target.latitude
            )));
        }

        Ok(IdwMapping {
            target_index,
            target: *target,
            candidates,
            is_fallback,
        })
    }

    /// Nearest-neighbor mapping for every target, in target order
    pub fn find_nearest_neighbors(&self, targets: &[ObservationPoint]) -> Result<Vec<NnMapping>> {
        try_par_map(targets.len(), |i| self.nearest_neighbor(i, &targets[i].coord))
    }

    /// IDW mapping for every target, in target order
    pub fn find_idw_neighbors(&self, targets: &[ObservationPoint]) -> Result<Vec<IdwMapping>> {
        try_par_map(targets.len(), |i| self.radius_neighbors(i, &targets[i].coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use georegrid_core::{distance, CollectingReporter, ErrorKind};

    fn point(lon: f64, lat: f64) -> ObservationPoint {
        ObservationPoint::new(lon, lat, 2020, vec![0.0])
    }

    fn config(metric: DistanceMetric, radius: f64, min: usize, max: usize) -> RegridConfig {
        RegridConfig::builder()
            .metric(metric)
            .radius(radius)
            .min_points(min)
            .max_points(max)
            .build()
            .unwrap()
    }

    /// Deterministic scatter of points over a lon/lat box
    fn scatter(n: usize, seed: u64) -> Vec<ObservationPoint> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..n)
            .map(|_| point(80.0 + 10.0 * next(), 40.0 + 10.0 * next()))
            .collect()
    }

    #[test]
    fn test_empty_source_is_lookup_error() {
        let cfg = RegridConfig::default();
        let err = SpatialMatcher::new(&[], &cfg).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let source = scatter(200, 7);
        let targets = scatter(50, 99);
        for metric in [DistanceMetric::Haversine, DistanceMetric::Euclidean] {
            let cfg = config(metric, 100.0, 1, 4);
            let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
            let mappings = matcher.find_nearest_neighbors(&targets).unwrap();
            assert_eq!(mappings.len(), targets.len());

            for (i, (m, t)) in mappings.iter().zip(&targets).enumerate() {
                let best = source
                    .iter()
                    .map(|s| distance(t.coord, s.coord, metric).unwrap())
                    .fold(f64::INFINITY, f64::min);
                let chosen = distance(t.coord, m.source, metric).unwrap();
                assert_eq!(m.target_index, i);
                assert_eq!(chosen, best, "target {} ({})", i, metric);
            }
        }
    }

    #[test]
    fn test_nearest_tie_keeps_first_source() {
        // Both sources are exactly 1 degree from the target
        let source = vec![point(1.0, 0.0), point(-1.0, 0.0)];
        let cfg = config(DistanceMetric::Euclidean, 500.0, 1, 2);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.nearest_neighbor(0, &Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(m.source, Coordinate::new(1.0, 0.0));

        let reversed = vec![point(-1.0, 0.0), point(1.0, 0.0)];
        let matcher = SpatialMatcher::new(&reversed, &cfg).unwrap();
        let m = matcher.nearest_neighbor(0, &Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(m.source, Coordinate::new(-1.0, 0.0));
    }

    #[test]
    fn test_euclidean_distance_reported_in_km() {
        let source = vec![point(1.0, 0.0)];
        let cfg = config(DistanceMetric::Euclidean, 500.0, 1, 1);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.nearest_neighbor(0, &Coordinate::new(0.0, 0.0)).unwrap();
        assert_relative_eq!(m.distance_km, 111.32, epsilon = 1e-9);
    }

    #[test]
    fn test_nearest_warns_beyond_radius() {
        let source = vec![point(10.0, 0.0)];
        let cfg = config(DistanceMetric::Haversine, 100.0, 1, 1);
        let reporter = CollectingReporter::new();
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap().with_reporter(&reporter);
        matcher.nearest_neighbor(0, &Coordinate::new(0.0, 0.0)).unwrap();
        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("exceeding radius"));
    }

    #[test]
    fn test_fallback_boundary_at_min_points() {
        // Three sources within ~80 km of the target, one far away
        let source = vec![
            point(88.5, 46.0),
            point(87.5, 46.0),
            point(88.0, 46.5),
            point(95.0, 46.0),
        ];
        let target = Coordinate::new(88.0, 46.0);

        let cfg = config(DistanceMetric::Haversine, 100.0, 3, 5);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.radius_neighbors(0, &target).unwrap();
        assert!(!m.is_fallback);
        assert_eq!(m.candidates.len(), 3);

        let cfg = config(DistanceMetric::Haversine, 100.0, 4, 5);
        let reporter = CollectingReporter::new();
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap().with_reporter(&reporter);
        let m = matcher.radius_neighbors(0, &target).unwrap();
        assert!(m.is_fallback);
        assert_eq!(m.candidates.len(), 1);
        // 88.5/46.0 and 87.5/46.0 are equidistant; the first one wins
        assert_eq!(m.candidates[0].source, Coordinate::new(88.5, 46.0));
        assert!(reporter.warnings()[0].contains("falling back"));
    }

    #[test]
    fn test_candidates_sorted_and_truncated() {
        let source = vec![
            point(0.3, 0.0),
            point(0.1, 0.0),
            point(-0.1, 0.0), // ties with 0.1, later in source order
            point(0.2, 0.0),
            point(0.4, 0.0),
        ];
        let cfg = config(DistanceMetric::Euclidean, 100.0, 1, 3);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.radius_neighbors(0, &Coordinate::new(0.0, 0.0)).unwrap();

        let lons: Vec<f64> = m.candidates.iter().map(|c| c.source.longitude).collect();
        assert_eq!(lons, vec![0.1, -0.1, 0.2]);
        assert!(m.candidates.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert_relative_eq!(m.candidates[0].distance_km, 11.132, epsilon = 1e-9);
    }

    #[test]
    fn test_example_scenario_both_in_radius() {
        let source = vec![
            ObservationPoint::new(87.25, 46.25, 2020, vec![1.0]),
            ObservationPoint::new(86.25, 46.25, 2020, vec![2.0]),
        ];
        let target = Coordinate::new(88.0, 46.0);

        // ~64 km and ~138 km away: only one inside 100 km, so min_points = 2
        // falls back to the nearest neighbor
        let cfg = config(DistanceMetric::Haversine, 100.0, 2, 4);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.radius_neighbors(0, &target).unwrap();
        assert!(m.is_fallback);
        assert_eq!(m.candidates[0].source, Coordinate::new(87.25, 46.25));

        let nn = matcher.nearest_neighbor(0, &target).unwrap();
        assert_eq!(nn.source, Coordinate::new(87.25, 46.25));
        assert_eq!(nn.distance_km, m.candidates[0].distance_km);
        assert!(nn.distance_km > 60.0 && nn.distance_km < 70.0);

        let cfg = config(DistanceMetric::Haversine, 150.0, 2, 4);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.radius_neighbors(0, &target).unwrap();
        assert!(!m.is_fallback);
        assert_eq!(m.candidates.len(), 2);
        assert_eq!(m.candidates[0].source, Coordinate::new(87.25, 46.25));
        assert!(m.candidates[1].distance_km > 130.0 && m.candidates[1].distance_km < 145.0);
    }

    #[test]
    fn test_repeated_locations_count_per_row() {
        let source = vec![
            ObservationPoint::new(0.1, 0.0, 2020, vec![1.0]),
            ObservationPoint::new(0.1, 0.0, 2021, vec![2.0]),
            ObservationPoint::new(0.5, 0.0, 2020, vec![3.0]),
            ObservationPoint::new(0.5, 0.0, 2021, vec![4.0]),
        ];
        let cfg = config(DistanceMetric::Euclidean, 100.0, 2, 2);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();

        // Both rows at 0.1 are in range and fill max_points on their own
        let m = matcher.radius_neighbors(0, &Coordinate::new(0.0, 0.0)).unwrap();
        assert!(!m.is_fallback);
        let lons: Vec<f64> = m.candidates.iter().map(|c| c.source.longitude).collect();
        assert_eq!(lons, vec![0.1, 0.1]);

        // A single location repeated for two years satisfies min_points = 2
        let cfg = config(DistanceMetric::Euclidean, 20.0, 2, 4);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.radius_neighbors(0, &Coordinate::new(0.0, 0.0)).unwrap();
        assert!(!m.is_fallback);
        assert_eq!(m.candidates.len(), 2);
    }

    #[test]
    fn test_antipodal_source_does_not_displace_minimum() {
        let target = Coordinate::new(34.04800974272453, -60.26783148772361);
        let source = vec![
            point(34.0, -60.0),
            point(214.04800974272453, 60.26783148772361),
        ];
        let cfg = config(DistanceMetric::Haversine, 100.0, 1, 2);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();

        let m = matcher.nearest_neighbor(0, &target).unwrap();
        assert_eq!(m.source, Coordinate::new(34.0, -60.0));
        assert!(m.distance_km.is_finite() && m.distance_km < 50.0);

        // Antipode first: the closer point still wins
        let reversed = vec![source[1].clone(), source[0].clone()];
        let matcher = SpatialMatcher::new(&reversed, &cfg).unwrap();
        let m = matcher.nearest_neighbor(0, &target).unwrap();
        assert_eq!(m.source, Coordinate::new(34.0, -60.0));
    }

    #[test]
    fn test_zero_radius_falls_back() {
        let source = vec![point(1.0, 1.0)];
        let cfg = config(DistanceMetric::Haversine, 0.0, 1, 1);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let m = matcher.radius_neighbors(0, &Coordinate::new(0.0, 0.0)).unwrap();
        assert!(m.is_fallback);

        // A co-located source is inside a zero radius
        let m = matcher.radius_neighbors(0, &Coordinate::new(1.0, 1.0)).unwrap();
        assert!(!m.is_fallback);
        assert_eq!(m.candidates[0].distance_km, 0.0);
    }

    #[test]
    fn test_invalid_target_coordinate() {
        let source = vec![point(0.0, 0.0)];
        let cfg = RegridConfig::default();
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let err = matcher.nearest_neighbor(0, &Coordinate::new(0.0, 95.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // The Euclidean radius conversion reports the real target
        let cfg = config(DistanceMetric::Euclidean, 100.0, 1, 1);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        match matcher.radius_neighbors(0, &Coordinate::new(12.5, 95.0)).unwrap_err() {
            Error::InvalidCoordinate { longitude, latitude, .. } => {
                assert_eq!(longitude, 12.5);
                assert_eq!(latitude, 95.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_matching_is_deterministic() {
        let source = scatter(300, 3);
        let targets = scatter(80, 5);
        let cfg = config(DistanceMetric::Haversine, 150.0, 2, 6);
        let matcher = SpatialMatcher::new(&source, &cfg).unwrap();
        let a = matcher.find_idw_neighbors(&targets).unwrap();
        let b = matcher.find_idw_neighbors(&targets).unwrap();
        assert_eq!(a, b);
    }
}
