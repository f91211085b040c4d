//! Fixed-width text writers for regridded data and mapping diagnostics
//!
//! All floating-point columns are written fixed-point at the configured
//! precision. Coordinates and time steps are right-aligned in 10-character
//! columns, values and distances in 12-character columns.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::mapping::{IdwMapping, NnMapping};
use crate::point::{Coordinate, ObservationPoint};

const NN_RULE: usize = 68;
const IDW_RULE: usize = 80;

/// Create the output directory (and parents) if missing
pub fn ensure_output_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write interpolated points under the given column headers
pub fn write_regridded(
    path: impl AsRef<Path>,
    headers: &[String],
    points: &[ObservationPoint],
    precision: usize,
) -> Result<()> {
    let mut w = create(path.as_ref())?;
    write_regridded_to(&mut w, headers, points, precision)?;
    w.flush()?;
    Ok(())
}

pub fn write_regridded_to<W: Write>(
    w: &mut W,
    headers: &[String],
    points: &[ObservationPoint],
    precision: usize,
) -> Result<()> {
    for (i, header) in headers.iter().enumerate() {
        let width = if i < 3 { 10 } else { 12 };
        write!(w, "{:>width$}", header, width = width)?;
    }
    writeln!(w)?;

    for point in points {
        write!(
            w,
            "{:>10.p$}{:>10.p$}{:>10}",
            point.coord.longitude,
            point.coord.latitude,
            point.time_step,
            p = precision
        )?;
        for value in &point.values {
            write!(w, "{:>12.p$}", value, p = precision)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write a sorted, de-duplicated coordinate listing
pub fn write_gridlist(path: impl AsRef<Path>, coords: &[Coordinate], precision: usize) -> Result<()> {
    let mut w = create(path.as_ref())?;
    write_gridlist_to(&mut w, coords, precision)?;
    w.flush()?;
    Ok(())
}

pub fn write_gridlist_to<W: Write>(w: &mut W, coords: &[Coordinate], precision: usize) -> Result<()> {
    let mut coords = coords.to_vec();
    coords.sort_by(|a, b| {
        a.longitude
            .total_cmp(&b.longitude)
            .then(a.latitude.total_cmp(&b.latitude))
    });
    coords.dedup();

    writeln!(w, "Lon\t Lat")?;
    for c in &coords {
        writeln!(w, "{:>10.p$}{:>10.p$}", c.longitude, c.latitude, p = precision)?;
    }
    Ok(())
}

/// Write nearest-neighbor mappings for diagnostics
pub fn write_nn_mappings(path: impl AsRef<Path>, mappings: &[NnMapping], precision: usize) -> Result<()> {
    let mut w = create(path.as_ref())?;
    write_nn_mappings_to(&mut w, mappings, precision)?;
    w.flush()?;
    Ok(())
}

pub fn write_nn_mappings_to<W: Write>(w: &mut W, mappings: &[NnMapping], precision: usize) -> Result<()> {
    let rule = "-".repeat(NN_RULE);
    writeln!(w, "Target_Lon Target_Lat Source_Lon Source_Lat Distance(km) Target_Index")?;
    writeln!(w, "{}", rule)?;
    for m in mappings {
        writeln!(
            w,
            "{:>10.p$}{:>10.p$}{:>10.p$}{:>10.p$}{:>12.p$}{:>12}",
            m.target.longitude,
            m.target.latitude,
            m.source.longitude,
            m.source.latitude,
            m.distance_km,
            m.target_index,
            p = precision
        )?;
        writeln!(w, "{}", rule)?;
    }
    Ok(())
}

/// Write IDW mappings for diagnostics, one row per candidate
pub fn write_idw_mappings(path: impl AsRef<Path>, mappings: &[IdwMapping], precision: usize) -> Result<()> {
    let mut w = create(path.as_ref())?;
    write_idw_mappings_to(&mut w, mappings, precision)?;
    w.flush()?;
    Ok(())
}

pub fn write_idw_mappings_to<W: Write>(w: &mut W, mappings: &[IdwMapping], precision: usize) -> Result<()> {
    let rule = "-".repeat(IDW_RULE);
    writeln!(
        w,
        "Target_Lon Target_Lat Source_Lon Source_Lat Distance(km) Target_Index Fallback"
    )?;
    writeln!(w, "{}", rule)?;
    for m in mappings {
        let flag = if m.is_fallback { "NN" } else { "" };
        for c in &m.candidates {
            writeln!(
                w,
                "{:>10.p$}{:>10.p$}{:>10.p$}{:>10.p$}{:>12.p$}{:>12}{:>8}",
                m.target.longitude,
                m.target.latitude,
                c.source.longitude,
                c.source.latitude,
                c.distance_km,
                m.target_index,
                flag,
                p = precision
            )?;
        }
        writeln!(w, "{}", rule)?;
    }
    Ok(())
}
