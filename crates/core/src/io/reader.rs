//! Whitespace-delimited dataset reader
//!
//! File format: one header line naming the columns, then one row per
//! observation:
//!
//! ```text
//! Lon     Lat     Year   Jan   Feb   ...
//! 87.25   46.25   2020   1.5   2.0   ...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::{DataLayout, RegridConfig, MONTHS};
use crate::error::{Error, Result};
use crate::point::{Coordinate, Dataset, ObservationPoint};
use crate::report::Reporter;

/// Read the column headers from the first line of a file
pub fn read_headers(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.split_whitespace().map(str::to_string).collect())
}

/// Read a whole dataset.
///
/// Rows whose longitude, latitude or time step do not parse are skipped
/// with a warning. Out-of-range coordinates, missing values and a file
/// without data rows are errors.
pub fn read_dataset(
    path: impl AsRef<Path>,
    config: &RegridConfig,
    reporter: &dyn Reporter,
) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse_dataset(BufReader::new(file), &path.display().to_string(), config, reporter)
}

/// Parse a dataset from any buffered source; `name` labels error messages
pub fn parse_dataset<R: BufRead>(
    reader: R,
    name: &str,
    config: &RegridConfig,
    reporter: &dyn Reporter,
) -> Result<Dataset> {
    let mut lines = reader.lines();
    let headers: Vec<String> = match lines.next() {
        Some(line) => line?.split_whitespace().map(str::to_string).collect(),
        None => Vec::new(),
    };

    let mut points = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line?;
        // Header is line 1
        let line_num = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(&line, line_num, name, config)? {
            Some(point) => points.push(point),
            None => reporter.warn(&format!(
                "Skipping malformed line {} in file: {}",
                line_num, name
            )),
        }
    }

    if points.is_empty() {
        return Err(Error::Parse {
            path: name.to_string(),
            line: 0,
            reason: "file contains no data rows".into(),
        });
    }

    Ok(Dataset::new(headers, points))
}

/// `Ok(None)` means the row key did not parse and the row should be skipped
fn parse_row(
    line: &str,
    line_num: usize,
    name: &str,
    config: &RegridConfig,
) -> Result<Option<ObservationPoint>> {
    let mut fields = line.split_whitespace();

    let lon = fields.next().and_then(|f| f.parse::<f64>().ok());
    let lat = fields.next().and_then(|f| f.parse::<f64>().ok());
    let time_step = fields.next().and_then(|f| f.parse::<i32>().ok());
    let (lon, lat, time_step) = match (lon, lat, time_step) {
        (Some(lon), Some(lat), Some(t)) => (lon, lat, t),
        _ => return Ok(None),
    };

    let parse_err = |reason: String| Error::Parse {
        path: name.to_string(),
        line: line_num,
        reason,
    };

    let mut coord = Coordinate::new(lon, lat);
    coord.validate().map_err(|e| parse_err(e.to_string()))?;
    if config.adjust_longitude {
        coord = coord.normalized();
    }

    let values = match config.layout {
        DataLayout::GridByTime => {
            let values: Vec<f64> = fields
                .take(MONTHS)
                .map_while(|f| f.parse::<f64>().ok())
                .collect();
            if values.len() < MONTHS {
                return Err(parse_err(format!(
                    "missing monthly values (found {}, expected {})",
                    values.len(),
                    MONTHS
                )));
            }
            values
        }
        DataLayout::YearByYear => {
            let values: Vec<f64> = fields.map_while(|f| f.parse::<f64>().ok()).collect();
            if values.is_empty() {
                return Err(parse_err("no values found".into()));
            }
            values
        }
    };

    Ok(Some(ObservationPoint {
        coord,
        time_step,
        values,
    }))
}
