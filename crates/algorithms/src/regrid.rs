//! Regrid pipeline: read → match → interpolate → write

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use georegrid_core::config::MONTHS;
use georegrid_core::io::{
    ensure_output_dir, read_dataset, write_gridlist, write_idw_mappings, write_nn_mappings,
    write_regridded,
};
use georegrid_core::{
    DataLayout, Error, IdwMapping, InterpolationMethod, NnMapping, NoopReporter,
    ObservationPoint, RegridConfig, Reporter, Result,
};

use crate::interpolation::Interpolator;
use crate::matcher::SpatialMatcher;
use crate::report::TracingReporter;

/// Name of the primary output file
pub const REGRIDDED_FILE: &str = "regridded.txt";
pub const SOURCE_GRIDLIST_FILE: &str = "source_gridlist.txt";
pub const TARGET_GRIDLIST_FILE: &str = "target_gridlist.txt";

/// Counts describing one regrid run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegridSummary {
    pub source_points: usize,
    pub target_points: usize,
    pub interpolated: usize,
    /// Targets that produced no output row
    pub skipped: usize,
    /// Interpolated IDW targets that took the nearest-neighbor fallback
    pub fallbacks: usize,
}

/// Result of [`regrid`]
#[derive(Debug, Clone)]
pub struct RegridOutput {
    pub points: Vec<ObservationPoint>,
    /// Empty unless the method is Nearest Neighbor or mappings were requested
    pub nn_mappings: Vec<NnMapping>,
    /// Empty unless the method is IDW or mappings were requested
    pub idw_mappings: Vec<IdwMapping>,
    pub summary: RegridSummary,
}

/// Regrid `source` values onto `target` locations in memory.
///
/// The source set is checked (non-empty, uniform value lengths) before any
/// target is matched.
pub fn regrid(
    source: &[ObservationPoint],
    target: &[ObservationPoint],
    config: &RegridConfig,
    reporter: &dyn Reporter,
) -> Result<RegridOutput> {
    config.validate()?;

    let interpolator = Interpolator::new(source, config)?.with_reporter(reporter);
    let matcher = SpatialMatcher::new(source, config)?.with_reporter(reporter);

    debug!(
        "Computing spatial mappings for {} targets over {} source points",
        target.len(),
        matcher.source().len()
    );
    let nn_mappings = if config.method == InterpolationMethod::NearestNeighbor || config.write_mappings
    {
        matcher.find_nearest_neighbors(target)?
    } else {
        Vec::new()
    };
    let idw_mappings =
        if config.method == InterpolationMethod::InverseDistanceWeighted || config.write_mappings {
            matcher.find_idw_neighbors(target)?
        } else {
            Vec::new()
        };

    debug!("Interpolating values ({})", config.method);
    let points = interpolator.interpolate(target, &nn_mappings, &idw_mappings)?;

    let fallbacks = match config.method {
        InterpolationMethod::InverseDistanceWeighted => idw_mappings
            .iter()
            .filter(|m| m.is_fallback && interpolator.resolves_fallback(target, m))
            .count(),
        InterpolationMethod::NearestNeighbor => 0,
    };
    let summary = RegridSummary {
        source_points: source.len(),
        target_points: target.len(),
        interpolated: points.len(),
        skipped: target.len() - points.len(),
        fallbacks,
    };

    Ok(RegridOutput {
        points,
        nn_mappings,
        idw_mappings,
        summary,
    })
}

/// Check the column headers of a source/target file pair
pub fn validate_headers(source: &[String], target: &[String], layout: DataLayout) -> Result<()> {
    if source.len() < 3 || target.len() < 3 {
        return Err(Error::InvalidHeaders(
            "source and target files need at least Lon, Lat and time columns".into(),
        ));
    }
    if layout == DataLayout::GridByTime && source.len() != 3 + MONTHS {
        return Err(Error::InvalidHeaders(format!(
            "grid-by-time layout requires {} monthly value columns plus Lon, Lat, Year (found {} columns)",
            MONTHS,
            source.len()
        )));
    }
    if source.len() != target.len() {
        return Err(Error::InvalidHeaders(format!(
            "source and target files have different number of columns ({} vs {})",
            source.len(),
            target.len()
        )));
    }
    Ok(())
}

/// File-to-file regridding
#[derive(Debug, Clone)]
pub struct Regridder {
    source_file: PathBuf,
    target_file: PathBuf,
    config: RegridConfig,
}

impl Regridder {
    pub fn new(
        source_file: impl Into<PathBuf>,
        target_file: impl Into<PathBuf>,
        config: RegridConfig,
    ) -> Result<Self> {
        let source_file = source_file.into();
        let target_file = target_file.into();
        if source_file.as_os_str().is_empty() {
            return Err(Error::InvalidParameter {
                name: "source_file",
                value: String::new(),
                reason: "path is empty".into(),
            });
        }
        if target_file.as_os_str().is_empty() {
            return Err(Error::InvalidParameter {
                name: "target_file",
                value: String::new(),
                reason: "path is empty".into(),
            });
        }
        config.validate()?;
        Ok(Self {
            source_file,
            target_file,
            config,
        })
    }

    pub fn config(&self) -> &RegridConfig {
        &self.config
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    /// Run with warnings going to `tracing` when `verbose` is set, and
    /// discarded otherwise
    pub fn run(&self) -> Result<RegridSummary> {
        if self.config.verbose {
            self.run_with(&TracingReporter)
        } else {
            self.run_with(&NoopReporter)
        }
    }

    /// Run, sending warnings and the fatal error (if any) to `reporter`
    pub fn run_with(&self, reporter: &dyn Reporter) -> Result<RegridSummary> {
        self.execute(reporter).map_err(|e| {
            reporter.error(&e.to_string());
            e
        })
    }

    fn execute(&self, reporter: &dyn Reporter) -> Result<RegridSummary> {
        let config = &self.config;

        info!("Reading source data from: {}", self.source_file.display());
        let source = read_dataset(&self.source_file, config, reporter)?;
        info!("Reading target data from: {}", self.target_file.display());
        let target = read_dataset(&self.target_file, config, reporter)?;

        validate_headers(&source.headers, &target.headers, config.layout)?;

        ensure_output_dir(&config.output_path)?;
        if config.write_gridlists {
            write_gridlist(
                config.output_file(SOURCE_GRIDLIST_FILE),
                &source.unique_coordinates(),
                config.precision,
            )?;
            write_gridlist(
                config.output_file(TARGET_GRIDLIST_FILE),
                &target.unique_coordinates(),
                config.precision,
            )?;
        }

        info!("Computing spatial mappings and interpolating values");
        let output = regrid(&source.points, &target.points, config, reporter)?;

        info!("Writing outputs to: {}", config.output_path.display());
        if config.write_mappings {
            if !output.nn_mappings.is_empty() {
                write_nn_mappings(
                    config.output_file(&config.nn_mappings_file),
                    &output.nn_mappings,
                    config.precision,
                )?;
            }
            if !output.idw_mappings.is_empty() {
                write_idw_mappings(
                    config.output_file(&config.idw_mappings_file),
                    &output.idw_mappings,
                    config.precision,
                )?;
            }
        }
        write_regridded(
            config.output_file(REGRIDDED_FILE),
            &source.headers,
            &output.points,
            config.precision,
        )?;

        info!(
            "Regridding completed: {} of {} targets interpolated",
            output.summary.interpolated, output.summary.target_points
        );
        Ok(output.summary)
    }
}
