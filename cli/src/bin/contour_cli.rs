use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use contour::{Hierarchy, MatchMethod, Point, RetrievalMode};
use contour_cli::{select, summarize, AnalysisConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional TOML or JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Override the configured threshold
    #[arg(short, long, global = true)]
    threshold: Option<u8>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace an image and print a JSON summary of its contours
    Contours {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Retrieval mode: external, list, ccomp or tree
        #[arg(short, long)]
        mode: Option<RetrievalMode>,
        /// Approximation accuracy used for the summary
        #[arg(long)]
        accuracy: Option<f64>,
        /// Write the traced contours as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Classify a point against a traced contour
    TestPoint {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, allow_hyphen_values = true)]
        x: i32,
        #[arg(short, long, allow_hyphen_values = true)]
        y: i32,
        /// Contour id (defaults to the first contour)
        #[arg(long)]
        contour: Option<usize>,
    },
    /// Compare the first external contours of two images
    Match {
        #[arg(long)]
        first: PathBuf,
        #[arg(long)]
        second: PathBuf,
        /// i1, i2 or i3
        #[arg(long, default_value = "i1")]
        method: MatchMethod,
    },
    /// Print the configuration file JSON schema
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }

    match cli.command {
        Commands::Contours { input, mode, accuracy, geojson } => {
            if let Some(mode) = mode {
                config.trace.mode = mode;
            }
            if let Some(accuracy) = accuracy {
                config.approx = config.approx.with_accuracy(accuracy)?;
            }
            let hierarchy = trace_file(&input, &config)?;
            let summary = summarize(&hierarchy, &config.approx)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if let Some(path) = geojson {
                hierarchy.save_geojson(&path.to_string_lossy())?;
                info!("GeoJSON written to {}", path.display());
            }
        }
        Commands::TestPoint { input, x, y, contour } => {
            let hierarchy = trace_file(&input, &config)?;
            let target = select(&hierarchy, contour)
                .ok_or_else(|| eyre!("No contour found in {}", input.display()))?;
            let point = Point::new(x, y);

            let report = serde_json::json!({
                "contour": target.id().0,
                "contains": target.contains_point(point),
                "classification": target.point_polygon_test(point, false),
                "distance": target.measure_distance(point),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Match { first, second, method } => {
            config.trace.mode = RetrievalMode::External;
            let a = trace_file(&first, &config)?;
            let b = trace_file(&second, &config)?;
            let (Some(a), Some(b)) = (a.head(), b.head()) else {
                return Err(eyre!("Both images need at least one contour"));
            };
            let score = a.match_shapes(&b, method, None)?;
            println!("{score}");
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&AnalysisConfig::schema())?);
        }
    }

    Ok(())
}

fn trace_file(path: &Path, config: &AnalysisConfig) -> Result<Hierarchy> {
    let image = image::open(path)?.to_luma8();
    let pipeline = config.pipeline();
    info!("{} on {}", pipeline.info(), path.display());

    let hierarchy = pipeline.process(&image)?;
    if hierarchy.is_empty() {
        warn!("No foreground found in {}", path.display());
    }
    Ok(hierarchy)
}
