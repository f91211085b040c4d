//! Distance metrics on longitude/latitude coordinates
//!
//! Two metrics are supported:
//! - **Haversine**: great-circle distance on a sphere of radius 6371 km,
//!   reported in kilometers.
//! - **Euclidean**: flat distance in the lon/lat plane, reported in
//!   **degrees**. Use [`degrees_from_km`] / [`km_from_euclidean`] to move
//!   between the two units.
//!
//! The degree/kilometer conversion uses a fixed 111.32 km per degree scaled
//! by `cos(latitude)`. It ignores any further distortion along the
//! longitude axis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::point::Coordinate;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree at the equator
pub const KM_PER_DEGREE: f64 = 111.32;

/// Lower bound for `|cos(latitude)|` when converting km to degrees
const MIN_COS_LAT: f64 = 1e-10;

/// Distance metric used for neighbor search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Planar distance in degrees
    Euclidean,
    /// Great-circle distance in kilometers
    #[default]
    Haversine,
}

impl DistanceMetric {
    /// Distance between two coordinates in this metric's native unit
    pub fn distance(self, a: Coordinate, b: Coordinate) -> Result<f64> {
        distance(a, b, self)
    }

    /// Convert a native distance to kilometers, measured at `latitude`
    #[inline]
    pub fn to_km(self, native: f64, latitude: f64) -> f64 {
        match self {
            DistanceMetric::Haversine => native,
            DistanceMetric::Euclidean => km_from_euclidean(native, latitude),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => write!(f, "euclidean"),
            DistanceMetric::Haversine => write!(f, "haversine"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" | "planar" => Ok(DistanceMetric::Euclidean),
            "haversine" | "great-circle" => Ok(DistanceMetric::Haversine),
            _ => Err(Error::invalid_parameter(
                "metric",
                s,
                "use euclidean or haversine",
            )),
        }
    }
}

/// Compute the distance between two coordinates.
///
/// Returns kilometers for [`DistanceMetric::Haversine`] and degrees for
/// [`DistanceMetric::Euclidean`]. Both coordinates are validated first.
pub fn distance(a: Coordinate, b: Coordinate, metric: DistanceMetric) -> Result<f64> {
    a.validate()?;
    b.validate()?;

    let d = match metric {
        DistanceMetric::Haversine => {
            let lat1 = a.latitude.to_radians();
            let lat2 = b.latitude.to_radians();
            let dlat = (b.latitude - a.latitude).to_radians();
            let dlon = (b.longitude - a.longitude).to_radians();

            // Rounding can push h just past 1 near the antipode
            let h = ((dlat / 2.0).sin().powi(2)
                + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2))
            .clamp(0.0, 1.0);
            let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
            EARTH_RADIUS_KM * c
        }
        DistanceMetric::Euclidean => {
            let dlon = b.longitude - a.longitude;
            let dlat = b.latitude - a.latitude;
            (dlon * dlon + dlat * dlat).sqrt()
        }
    };

    Ok(d)
}

/// Convert a kilometer radius to degrees at the given latitude.
///
/// The cosine term is clamped near the poles so the result stays finite.
pub fn degrees_from_km(km: f64, latitude: f64) -> Result<f64> {
    if km < 0.0 || !km.is_finite() {
        return Err(Error::invalid_parameter(
            "radius",
            km,
            "distance in km must be non-negative",
        ));
    }
    if latitude.abs() > 90.0 || !latitude.is_finite() {
        return Err(Error::invalid_parameter(
            "latitude",
            latitude,
            "must be in [-90, 90]",
        ));
    }

    let mut cos_lat = latitude.to_radians().cos();
    if cos_lat.abs() < MIN_COS_LAT {
        cos_lat = MIN_COS_LAT;
    }
    Ok(km / (KM_PER_DEGREE * cos_lat))
}

/// Convert a Euclidean (degree) distance to kilometers at the given latitude
#[inline]
pub fn km_from_euclidean(distance_deg: f64, latitude: f64) -> f64 {
    distance_deg * KM_PER_DEGREE * latitude.to_radians().cos()
}

/// Wrap a longitude into `[-180, 180]`
pub fn normalize_longitude(mut lon: f64) -> f64 {
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}
