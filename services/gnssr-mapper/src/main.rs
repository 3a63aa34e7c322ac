//! GNSS-R map production.
//!
//! Grids observations from the local segment archive into averaged maps:
//! - `map`: accumulate a period of segments and render the averaged map
//! - `coast-preview`: render a coastal distance raster on the map grid

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use gnssr_common::DataLevel;
use gnssr_mapper::config::PeriodConfig;
use gnssr_mapper::output::{coast_preview, coast_preview_options, write_json, write_png};
use gnssr_mapper::{Mapper, MapperConfig};
use renderer::ColorRamp;

#[derive(Parser, Debug)]
#[command(name = "gnssr-mapper")]
#[command(about = "Grid GNSS-R observations into averaged maps")]
struct Args {
    /// Log level
    #[arg(long, global = true, env = "GNSSR_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Accumulate a period of archive segments and render the averaged map
    Map {
        /// Configuration file (YAML)
        #[arg(short, long, env = "GNSSR_CONFIG")]
        config: Option<PathBuf>,

        /// Archive root directory
        #[arg(long, env = "GNSSR_DATA_ROOT")]
        data_root: Option<PathBuf>,

        /// Archive data level (L1B or L2_FDI)
        #[arg(long)]
        level: Option<String>,

        /// Period start (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Period stop (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        stop: Option<String>,

        /// Grid cell size at the equator (km)
        #[arg(long)]
        cell_size_km: Option<f64>,

        /// Coastal distance raster
        #[arg(long, env = "GNSSR_COAST_RASTER")]
        coast_raster: Option<PathBuf>,

        /// Drop observations closer to the coast than this (km)
        #[arg(long)]
        min_coast_distance_km: Option<f64>,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also dump the averaged grid as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Colour ramp (jet, gray, coast)
        #[arg(long)]
        ramp: Option<String>,
    },

    /// Render a coastal distance raster sampled on the map grid
    CoastPreview {
        /// Coastal distance raster
        #[arg(long, env = "GNSSR_COAST_RASTER")]
        raster: PathBuf,

        /// Grid cell size at the equator (km)
        #[arg(long, default_value = "200")]
        cell_size_km: f64,

        /// Output pixels per grid cell
        #[arg(long, default_value = "4")]
        scale: u32,

        /// Output PNG path
        #[arg(short, long, default_value = "coast_distance.png")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    #[cfg(feature = "netcdf")]
    coastal_distance::silence_hdf5_errors();

    match args.command {
        Command::Map {
            config,
            data_root,
            level,
            start,
            stop,
            cell_size_km,
            coast_raster,
            min_coast_distance_km,
            output,
            json,
            ramp,
        } => {
            let mut config = match config {
                Some(path) => MapperConfig::from_file(&path)?,
                None => MapperConfig::default(),
            };

            // Command line overrides
            if let Some(root) = data_root {
                config.archive.root = root;
            }
            if let Some(level) = level {
                config.archive.level = DataLevel::from_name(&level)
                    .with_context(|| format!("Unknown data level: {}", level))?;
            }
            if start.is_some() || stop.is_some() {
                let current = config.period.take();
                let pick = |cli: Option<String>, file: Option<String>, name: &str| {
                    cli.or(file)
                        .with_context(|| format!("Period {} not configured", name))
                };
                config.period = Some(PeriodConfig {
                    start: pick(start, current.as_ref().map(|p| p.start.clone()), "start")?,
                    stop: pick(stop, current.map(|p| p.stop), "stop")?,
                });
            }
            if let Some(cell_size_km) = cell_size_km {
                config.grid.cell_size_km = cell_size_km;
            }
            if let Some(raster) = coast_raster {
                config.coast.raster = Some(raster);
            }
            if let Some(min) = min_coast_distance_km {
                config.coast.min_distance_km = Some(min);
            }
            if let Some(output) = output {
                config.output.png = output;
            }
            if let Some(json) = json {
                config.output.json = Some(json);
            }
            if let Some(ramp) = ramp {
                config.render.ramp = ColorRamp::from_name(&ramp)?;
            }

            config.validate()?;
            run_map(config)
        }
        Command::CoastPreview {
            raster,
            cell_size_km,
            scale,
            output,
        } => {
            info!(
                raster = %raster.display(),
                cell_size_km = cell_size_km,
                "Rendering coastal distance preview"
            );
            coast_preview(&raster, cell_size_km, &output, &coast_preview_options(scale))?;
            Ok(())
        }
    }
}

fn run_map(config: MapperConfig) -> Result<()> {
    let (start, stop) = config
        .period
        .as_ref()
        .context("No period configured")?
        .range()?;

    let mapper = Mapper::new(config)?;
    let result = mapper.run(start, stop)?;
    let config = mapper.config();

    let average = result.average();
    if let Some(path) = &config.output.json {
        write_json(path, &average, mapper.indexer())?;
    }
    write_png(&config.output.png, average, mapper.indexer(), &config.render)?;

    let stats = &result.stats;
    println!(
        "Segments:      {} total, {} processed, {} missing",
        stats.segments_total, stats.segments_processed, stats.segments_missing
    );
    println!(
        "Observations:  {} read, {} kept",
        stats.observations_read, stats.observations_kept
    );
    println!("  off grid:    {}", stats.observations_off_grid);
    println!("  near coast:  {}", stats.observations_near_coast);
    println!(
        "Cells:         {} populated of {}",
        stats.populated_cells,
        mapper.indexer().len()
    );
    println!("Map:           {}", config.output.png.display());

    Ok(())
}
