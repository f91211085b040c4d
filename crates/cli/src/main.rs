//! georegrid CLI - regrid scattered geospatial time series

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use georegrid_algorithms::regrid::REGRIDDED_FILE;
use georegrid_algorithms::{set_num_threads, Regridder, TracingReporter};
use georegrid_core::io::{read_dataset, write_gridlist};
use georegrid_core::{
    DataLayout, Dataset, DistanceMetric, InterpolationMethod, RegridConfig, RegridConfigBuilder,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "georegrid")]
#[command(author, version, about = "Regrid scattered geospatial time series", long_about = None)]
struct Cli {
    /// Verbose output (also reports skipped rows and fallbacks)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (default: all cores)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpolate source values onto target points
    Regrid {
        /// Source data file
        #[arg(short, long)]
        source: PathBuf,
        /// Target points file
        #[arg(short, long)]
        target: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON config file; command-line options override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Interpolation method: nn, idw
        #[arg(short, long)]
        method: Option<String>,
        /// Distance metric: haversine, euclidean
        #[arg(long)]
        metric: Option<String>,
        /// Input layout: grid-by-time, year-by-year
        #[arg(short, long)]
        layout: Option<String>,
        /// IDW search radius in km
        #[arg(short, long)]
        radius: Option<f64>,
        /// IDW weighting power
        #[arg(short, long)]
        power: Option<f64>,
        /// Minimum in-radius points before falling back to nearest neighbor
        #[arg(long)]
        min_points: Option<usize>,
        /// Maximum points used per target
        #[arg(long)]
        max_points: Option<usize>,
        /// Decimal places in output files
        #[arg(long)]
        precision: Option<usize>,
        /// Write nearest-neighbor and IDW mapping files
        #[arg(long)]
        write_mappings: bool,
        /// Keep longitudes as read instead of wrapping to [-180, 180]
        #[arg(long)]
        no_adjust_longitude: bool,
        /// Skip the source/target gridlist files
        #[arg(long)]
        no_gridlists: bool,
    },
    /// Show information about a data file
    Info {
        /// Input data file
        input: PathBuf,
        /// Input layout: grid-by-time, year-by-year
        #[arg(short, long, default_value = "grid-by-time")]
        layout: String,
        /// Keep longitudes as read instead of wrapping to [-180, 180]
        #[arg(long)]
        no_adjust_longitude: bool,
    },
    /// Write the unique coordinates of a data file
    Gridlist {
        /// Input data file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Input layout: grid-by-time, year-by-year
        #[arg(short, long, default_value = "grid-by-time")]
        layout: String,
        /// Keep longitudes as read instead of wrapping to [-180, 180]
        #[arg(long)]
        no_adjust_longitude: bool,
        /// Decimal places
        #[arg(long, default_value = "5")]
        precision: usize,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_layout(s: &str) -> Result<DataLayout> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Reader settings for `info` and `gridlist`, matching what `regrid` uses
fn input_config(layout: &str, no_adjust_longitude: bool) -> Result<RegridConfig> {
    Ok(RegridConfig {
        layout: parse_layout(layout)?,
        adjust_longitude: !no_adjust_longitude,
        ..Default::default()
    })
}

fn read_input(path: &Path, config: &RegridConfig) -> Result<Dataset> {
    let pb = spinner("Reading data...");
    let dataset = read_dataset(path, config, &TracingReporter)
        .with_context(|| format!("Failed to read {}", path.display()));
    pb.finish_and_clear();
    dataset
}

/// Options of the `regrid` subcommand that can override the config file
struct RegridOverrides {
    output: Option<PathBuf>,
    method: Option<String>,
    metric: Option<String>,
    layout: Option<String>,
    radius: Option<f64>,
    power: Option<f64>,
    min_points: Option<usize>,
    max_points: Option<usize>,
    precision: Option<usize>,
    write_mappings: bool,
    no_adjust_longitude: bool,
    no_gridlists: bool,
}

fn build_config(
    file: Option<&PathBuf>,
    o: RegridOverrides,
    verbose: bool,
) -> Result<RegridConfig> {
    let mut builder = match file {
        Some(path) => RegridConfigBuilder::from_config(
            RegridConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
        ),
        None => RegridConfig::builder(),
    };

    if let Some(output) = o.output {
        builder = builder.output_path(output);
    }
    if let Some(method) = o.method {
        let method: InterpolationMethod = method.parse().map_err(|e| anyhow::anyhow!("{}", e))?;
        builder = builder.method(method);
    }
    if let Some(metric) = o.metric {
        let metric: DistanceMetric = metric.parse().map_err(|e| anyhow::anyhow!("{}", e))?;
        builder = builder.metric(metric);
    }
    if let Some(layout) = o.layout {
        builder = builder.layout(parse_layout(&layout)?);
    }
    if let Some(radius) = o.radius {
        builder = builder.radius(radius);
    }
    if let Some(power) = o.power {
        builder = builder.power(power);
    }
    if let Some(n) = o.max_points {
        builder = builder.max_points(n);
    }
    if let Some(n) = o.min_points {
        builder = builder.min_points(n);
    }
    if let Some(digits) = o.precision {
        builder = builder.precision(digits);
    }
    if o.write_mappings {
        builder = builder.write_mappings(true);
    }
    if o.no_adjust_longitude {
        builder = builder.adjust_longitude(false);
    }
    if o.no_gridlists {
        builder = builder.write_gridlists(false);
    }
    if verbose {
        builder = builder.verbose(true);
    }

    builder.build().context("Invalid configuration")
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    if let Some(threads) = cli.threads {
        set_num_threads(threads);
    }

    match cli.command {
        // ── Regrid ───────────────────────────────────────────────────
        Commands::Regrid {
            source,
            target,
            output,
            config,
            method,
            metric,
            layout,
            radius,
            power,
            min_points,
            max_points,
            precision,
            write_mappings,
            no_adjust_longitude,
            no_gridlists,
        } => {
            let overrides = RegridOverrides {
                output,
                method,
                metric,
                layout,
                radius,
                power,
                min_points,
                max_points,
                precision,
                write_mappings,
                no_adjust_longitude,
                no_gridlists,
            };
            let config = build_config(config.as_ref(), overrides, cli.verbose)?;
            info!(
                "Method: {}, metric: {}, radius: {} km, points: {}..{}",
                config.method, config.metric, config.radius, config.min_points, config.max_points
            );

            let output_file = config.output_file(REGRIDDED_FILE);
            let regridder = Regridder::new(&source, &target, config)?;

            let pb = spinner("Regridding...");
            let start = Instant::now();
            let summary = regridder.run();
            pb.finish_and_clear();
            let summary = summary.context("Regridding failed")?;
            let elapsed = start.elapsed();

            println!("Regridded data saved to: {}", output_file.display());
            println!(
                "  Targets: {} interpolated, {} skipped, {} fallbacks",
                summary.interpolated, summary.skipped, summary.fallbacks
            );
            println!("  Processing time: {:.2?}", elapsed);
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info {
            input,
            layout,
            no_adjust_longitude,
        } => {
            let config = input_config(&layout, no_adjust_longitude)?;
            let dataset = read_input(&input, &config)?;
            let summary = dataset.summary();

            println!("File: {}", input.display());
            println!("Columns: {}", dataset.headers.join(" "));
            println!(
                "Rows: {} ({} distinct locations)",
                summary.points, summary.unique_coords
            );
            println!("Value columns: {}", summary.value_columns);
            if let Some((first, last)) = summary.time_range {
                println!("Time steps: {} - {}", first, last);
            }
            if let Some((min_lon, min_lat, max_lon, max_lat)) = summary.bounds {
                println!(
                    "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                    min_lon, min_lat, max_lon, max_lat
                );
            }
            if let Err(e) = dataset.validate_uniform() {
                println!("Warning: {}", e);
            }
        }

        // ── Gridlist ─────────────────────────────────────────────────
        Commands::Gridlist {
            input,
            output,
            layout,
            no_adjust_longitude,
            precision,
        } => {
            let config = input_config(&layout, no_adjust_longitude)?;
            let dataset = read_input(&input, &config)?;
            let coords = dataset.unique_coordinates();
            write_gridlist(&output, &coords, precision).context("Failed to write gridlist")?;
            println!("Gridlist ({} locations) saved to: {}", coords.len(), output.display());
        }
    }

    Ok(())
}
