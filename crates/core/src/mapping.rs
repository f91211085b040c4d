//! Target-to-source mapping records
//!
//! Produced by the spatial matcher and consumed by the interpolator and
//! the diagnostic writers. Every distance stored here is in kilometers,
//! whatever metric found it.

use serde::{Deserialize, Serialize};

use crate::point::Coordinate;

/// A source location paired with its distance (km) to one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborCandidate {
    pub source: Coordinate,
    pub distance_km: f64,
}

impl NeighborCandidate {
    pub fn new(source: Coordinate, distance_km: f64) -> Self {
        Self { source, distance_km }
    }
}

/// Nearest-neighbor assignment for one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NnMapping {
    pub target_index: usize,
    pub target: Coordinate,
    pub source: Coordinate,
    pub distance_km: f64,
}

/// Inverse-distance-weighted neighbor set for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdwMapping {
    pub target_index: usize,
    pub target: Coordinate,
    /// Sorted ascending by distance, at most `max_points` long
    pub candidates: Vec<NeighborCandidate>,
    /// The list holds the single nearest neighbor because too few points
    /// fell inside the radius
    pub is_fallback: bool,
}

impl IdwMapping {
    /// The lone candidate of a fallback mapping
    pub fn fallback_source(&self) -> Option<&NeighborCandidate> {
        match (self.is_fallback, self.candidates.as_slice()) {
            (true, [only]) => Some(only),
            _ => None,
        }
    }
}
