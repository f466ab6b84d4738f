//! Developer checks for the density and contour pipeline.

mod checks;
mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use kde_common::{AccumulatorConfig, KdeConfig};
use kde_layer::{load_layer_file, DensityLayer, LayerConfig};

#[derive(Parser)]
#[command(name = "kde-check")]
#[command(about = "Validation checks for kernel density fields and contours", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare pruned fields against the full kernel sum
    Tolerance {
        /// Number of random points
        #[arg(short, long, default_value = "200")]
        points: usize,

        /// Side length of the square the points are drawn from
        #[arg(long, default_value = "0.05")]
        extent: f64,

        /// Cutoff distances, in bandwidths
        #[arg(short, long, value_delimiter = ',', default_value = "2,3,4,5")]
        sigmas: Vec<f64>,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Time each pipeline stage
    Timing {
        /// Number of random points
        #[arg(short, long, default_value = "500")]
        points: usize,

        /// Side length of the square the points are drawn from
        #[arg(long, default_value = "0.05")]
        extent: f64,

        /// Runs per stage
        #[arg(short, long, default_value = "5")]
        repeats: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Contour a GeoJSON point FeatureCollection
    Contour {
        /// Point FeatureCollection with a `density` property
        #[arg(short, long)]
        input: PathBuf,

        /// YAML layer file; the first layer's settings are used
        #[arg(short, long)]
        layers: Option<PathBuf>,

        /// Write polygons here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    // Grid size, bandwidth and default radius come from KDE_* variables when set.
    let config = KdeConfig::from_env();
    config.validate().context("invalid KDE_* environment configuration")?;

    match cli.command {
        Commands::Tolerance {
            points,
            extent,
            sigmas,
            seed,
            json,
        } => {
            let samples = checks::random_points(points, extent, seed);
            info!(points = points, grid_size = config.grid_size, bandwidth = config.bandwidth, "Running tolerance check");

            let results = checks::check_tolerance(&samples, config.grid_size, config.bandwidth, &sigmas)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("{}", report::format_tolerance_table(&results));
            }

            let failed = results.iter().filter(|r| !r.passed()).count();
            if failed > 0 {
                bail!("{} cutoff(s) exceeded the truncation bound", failed);
            }
            Ok(())
        }
        Commands::Timing {
            points,
            extent,
            repeats,
            seed,
        } => {
            let samples = checks::random_points(points, extent, seed);
            info!(points = points, repeats = repeats, "Timing pipeline");

            let timings = checks::time_pipeline(&samples, &config, repeats)?;
            println!("{}", report::format_timing_table(&timings));
            Ok(())
        }
        Commands::Contour {
            input,
            layers,
            output,
        } => {
            let layer_config = match layers {
                Some(path) => load_layer_file(&path)?
                    .into_iter()
                    .next()
                    .with_context(|| format!("no layers defined in {}", path.display()))?,
                None => LayerConfig::new("input")
                    .with_kde(config)
                    .with_accumulator(AccumulatorConfig::from_env()),
            };

            let contents = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let collection: Value = serde_json::from_str(&contents)?;

            let mut layer = DensityLayer::from_config(layer_config)?;
            layer.add_feature_collection(&collection)?;
            let polygons = layer.polygons()?;
            let features = polygons.len();
            let json = polygons.to_json_string()?;

            info!(
                layer = %layer.id(),
                samples = layer.len(),
                features = features,
                "Contoured input"
            );

            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(())
        }
    }
}
