//! Points and datasets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::distance::normalize_longitude;
use crate::error::{Error, Result};

/// Tolerance (degrees) when matching a mapped coordinate back to a source point
pub const COORD_EPSILON: f64 = 1e-6;

/// A longitude/latitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Check `|latitude| <= 90` and `|longitude| <= 360`
    pub fn validate(&self) -> Result<()> {
        let reason = if !self.latitude.is_finite() || !self.longitude.is_finite() {
            "coordinates must be finite"
        } else if self.latitude.abs() > 90.0 {
            "latitude must be in [-90, 90]"
        } else if self.longitude.abs() > 360.0 {
            "longitude must be in [-360, 360]"
        } else {
            return Ok(());
        };
        Err(Error::InvalidCoordinate {
            longitude: self.longitude,
            latitude: self.latitude,
            reason: reason.into(),
        })
    }

    /// Same point with longitude wrapped into `[-180, 180]`
    pub fn normalized(self) -> Self {
        Self::new(normalize_longitude(self.longitude), self.latitude)
    }

    /// Component-wise equality within [`COORD_EPSILON`]
    #[inline]
    pub fn approx_eq(&self, other: &Coordinate) -> bool {
        (self.longitude - other.longitude).abs() < COORD_EPSILON
            && (self.latitude - other.latitude).abs() < COORD_EPSILON
    }
}

/// One row of a dataset: a location, a time step and its values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub coord: Coordinate,
    /// Time identifier, e.g. a year
    pub time_step: i32,
    /// One value per variable or month
    pub values: Vec<f64>,
}

impl ObservationPoint {
    pub fn new(longitude: f64, latitude: f64, time_step: i32, values: Vec<f64>) -> Self {
        Self {
            coord: Coordinate::new(longitude, latitude),
            time_step,
            values,
        }
    }

    /// True when this point sits at `coord` (within tolerance) for `time_step`
    #[inline]
    pub fn matches(&self, coord: &Coordinate, time_step: i32) -> bool {
        self.time_step == time_step && self.coord.approx_eq(coord)
    }
}

/// Check that every point carries the same number of values.
///
/// Returns the shared length (0 for an empty slice).
pub fn validate_uniform(points: &[ObservationPoint]) -> Result<usize> {
    let expected = match points.first() {
        Some(p) => p.values.len(),
        None => return Ok(0),
    };
    for (index, p) in points.iter().enumerate() {
        if p.values.len() != expected {
            return Err(Error::InconsistentValues {
                index,
                expected,
                found: p.values.len(),
            });
        }
    }
    Ok(expected)
}

/// Points read from one file, with the file's column headers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub points: Vec<ObservationPoint>,
}

/// Summary statistics of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub points: usize,
    pub unique_coords: usize,
    pub value_columns: usize,
    pub time_range: Option<(i32, i32)>,
    /// (min_lon, min_lat, max_lon, max_lat)
    pub bounds: Option<(f64, f64, f64, f64)>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, points: Vec<ObservationPoint>) -> Self {
        Self { headers, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check that all points share one value-vector length
    pub fn validate_uniform(&self) -> Result<usize> {
        validate_uniform(&self.points)
    }

    /// Distinct coordinates, sorted by longitude then latitude
    pub fn unique_coordinates(&self) -> Vec<Coordinate> {
        let mut coords: Vec<Coordinate> = self.points.iter().map(|p| p.coord).collect();
        coords.sort_by(|a, b| {
            a.longitude
                .total_cmp(&b.longitude)
                .then(a.latitude.total_cmp(&b.latitude))
        });
        coords.dedup();
        coords
    }

    pub fn summary(&self) -> DatasetSummary {
        let time_steps: BTreeSet<i32> = self.points.iter().map(|p| p.time_step).collect();
        let time_range = match (time_steps.first(), time_steps.last()) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        };

        let bounds = self.points.iter().fold(None, |acc, p| {
            let (lon, lat) = (p.coord.longitude, p.coord.latitude);
            Some(match acc {
                None => (lon, lat, lon, lat),
                Some((x0, y0, x1, y1)) => {
                    (f64::min(x0, lon), f64::min(y0, lat), f64::max(x1, lon), f64::max(y1, lat))
                }
            })
        });

        DatasetSummary {
            points: self.points.len(),
            unique_coords: self.unique_coordinates().len(),
            value_columns: self.points.first().map_or(0, |p| p.values.len()),
            time_range,
            bounds,
        }
    }
}
