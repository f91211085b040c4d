//! Regridding configuration
//!
//! [`RegridConfig`] is an immutable bundle of parameters shared by the
//! matcher, the interpolator and the file pipeline. Build one with
//! [`RegridConfigBuilder`] or load it from JSON; both paths run the same
//! validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};

/// How target values are derived from source values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Copy the values of the closest source point
    NearestNeighbor,
    /// Blend in-radius source points weighted by `1 / d^power`
    #[default]
    InverseDistanceWeighted,
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationMethod::NearestNeighbor => write!(f, "nearest-neighbor"),
            InterpolationMethod::InverseDistanceWeighted => write!(f, "idw"),
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nn" | "nearest" | "nearest-neighbor" => Ok(InterpolationMethod::NearestNeighbor),
            "idw" | "inverse-distance" => Ok(InterpolationMethod::InverseDistanceWeighted),
            _ => Err(Error::invalid_parameter("method", s, "use nn or idw")),
        }
    }
}

/// Row layout of the input text files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLayout {
    /// One file per year: any number of value columns per row
    YearByYear,
    /// Rows keyed by cell and year, with exactly 12 monthly values
    #[default]
    GridByTime,
}

impl DataLayout {
    /// Fixed number of value columns, if the layout imposes one
    pub fn value_columns(self) -> Option<usize> {
        match self {
            DataLayout::GridByTime => Some(MONTHS),
            DataLayout::YearByYear => None,
        }
    }
}

impl FromStr for DataLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "grid-by-time" | "grid_by_time" => Ok(DataLayout::GridByTime),
            "year-by-year" | "year_by_year" => Ok(DataLayout::YearByYear),
            _ => Err(Error::invalid_parameter(
                "layout",
                s,
                "use grid-by-time or year-by-year",
            )),
        }
    }
}

/// Monthly value columns in [`DataLayout::GridByTime`] files
pub const MONTHS: usize = 12;

/// Parameters for a regrid run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegridConfig {
    pub method: InterpolationMethod,
    pub metric: DistanceMetric,
    pub layout: DataLayout,
    /// IDW search radius in km (converted to degrees for Euclidean)
    pub radius: f64,
    /// IDW weighting power
    pub power: f64,
    /// Upper bound on IDW neighbors
    pub max_points: usize,
    /// Fewer in-radius neighbors than this triggers the nearest-neighbor fallback
    pub min_points: usize,
    /// Wrap input longitudes into [-180, 180]
    pub adjust_longitude: bool,
    /// Decimal places in every written file
    pub precision: usize,
    pub verbose: bool,
    pub write_mappings: bool,
    pub write_gridlists: bool,
    pub nn_mappings_file: String,
    pub idw_mappings_file: String,
    pub output_path: PathBuf,
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::default(),
            metric: DistanceMetric::default(),
            layout: DataLayout::default(),
            radius: 100.0,
            power: 2.0,
            max_points: 5,
            min_points: 5,
            adjust_longitude: true,
            precision: 5,
            verbose: false,
            write_mappings: false,
            write_gridlists: true,
            nn_mappings_file: "nn_mappings.txt".to_string(),
            idw_mappings_file: "idw_mappings.txt".to_string(),
            output_path: PathBuf::from("./"),
        }
    }
}

impl RegridConfig {
    pub fn builder() -> RegridConfigBuilder {
        RegridConfigBuilder::default()
    }

    /// Check every parameter rule
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(Error::invalid_parameter(
                "radius",
                self.radius,
                "must be non-negative",
            ));
        }
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(Error::invalid_parameter("power", self.power, "must be positive"));
        }
        if self.max_points == 0 {
            return Err(Error::invalid_parameter("max_points", 0, "must be positive"));
        }
        if self.min_points == 0 {
            return Err(Error::invalid_parameter("min_points", 0, "must be positive"));
        }
        if self.min_points > self.max_points {
            return Err(Error::invalid_parameter(
                "min_points",
                self.min_points,
                format!("cannot exceed max_points ({})", self.max_points),
            ));
        }
        if self.nn_mappings_file.trim().is_empty() {
            return Err(Error::invalid_parameter("nn_mappings_file", "", "cannot be empty"));
        }
        if self.idw_mappings_file.trim().is_empty() {
            return Err(Error::invalid_parameter("idw_mappings_file", "", "cannot be empty"));
        }
        Ok(())
    }

    /// Load a JSON config; missing keys take their defaults and an absent
    /// `min_points` follows `max_points`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
        let has_min_points = value.get("min_points").is_some();

        let mut config: RegridConfig = serde_json::from_value(value)?;
        if !has_min_points {
            config.min_points = config.max_points;
        }
        config.validate()?;
        Ok(config)
    }

    /// Path of a file inside the output directory
    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output_path.join(name)
    }
}

/// Builder for [`RegridConfig`].
///
/// Unless `min_points` is set explicitly it follows `max_points`.
#[derive(Debug, Clone, Default)]
pub struct RegridConfigBuilder {
    config: RegridConfig,
    min_points: Option<usize>,
}

impl RegridConfigBuilder {
    /// Start from an existing config, e.g. one loaded from a file
    pub fn from_config(config: RegridConfig) -> Self {
        let min_points = Some(config.min_points);
        Self { config, min_points }
    }

    pub fn method(mut self, method: InterpolationMethod) -> Self {
        self.config.method = method;
        self
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.config.metric = metric;
        self
    }

    pub fn layout(mut self, layout: DataLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn radius(mut self, km: f64) -> Self {
        self.config.radius = km;
        self
    }

    pub fn power(mut self, power: f64) -> Self {
        self.config.power = power;
        self
    }

    pub fn max_points(mut self, n: usize) -> Self {
        self.config.max_points = n;
        self
    }

    pub fn min_points(mut self, n: usize) -> Self {
        self.min_points = Some(n);
        self
    }

    pub fn adjust_longitude(mut self, adjust: bool) -> Self {
        self.config.adjust_longitude = adjust;
        self
    }

    pub fn precision(mut self, digits: usize) -> Self {
        self.config.precision = digits;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn write_mappings(mut self, write: bool) -> Self {
        self.config.write_mappings = write;
        self
    }

    pub fn write_gridlists(mut self, write: bool) -> Self {
        self.config.write_gridlists = write;
        self
    }

    pub fn nn_mappings_file(mut self, name: impl Into<String>) -> Self {
        self.config.nn_mappings_file = name.into();
        self
    }

    pub fn idw_mappings_file(mut self, name: impl Into<String>) -> Self {
        self.config.idw_mappings_file = name.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Validate and produce the config
    pub fn build(self) -> Result<RegridConfig> {
        let mut config = self.config;
        config.min_points = self.min_points.unwrap_or(config.max_points);
        config.validate()?;
        Ok(config)
    }
}
