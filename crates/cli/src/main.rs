//! Burned area CLI - change detection between two Sentinel-2 acquisitions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use burned_area_algorithms::imagery::{BurnedArea, BurnedAreaInput, BurnedAreaParams, ClassCounts};
use burned_area_catalog::{output_name, Acquisition, BandKeys, CatalogWriter};
use burned_area_core::io::{read_geotiff, CompressionMethod, GeoTiffOptions};
use burned_area_core::{Algorithm, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "burned-area")]
#[command(author, version, about = "Burned area detection from Sentinel-2 imagery", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (defaults to one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect burned area between a pre-event and a post-event acquisition
    Detect {
        /// STAC item (JSON) of the pre-event acquisition
        #[arg(long)]
        pre_event: PathBuf,
        /// STAC item (JSON) of the post-event acquisition
        #[arg(long)]
        post_event: PathBuf,
        /// Minimum NDVI change for a burned pixel
        #[arg(long, default_value = "0.19")]
        ndvi_threshold: f64,
        /// Minimum NDWI change for a burned pixel
        #[arg(long, default_value = "0.18")]
        ndwi_threshold: f64,
        /// Directory receiving catalog.json and the product folder
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// GeoTIFF compression: deflate, lzw, none
        #[arg(short, long, default_value = "deflate")]
        compression: String,
    },
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set default subscriber")
}

fn setup_threads(threads: Option<usize>) -> Result<()> {
    if let Some(n) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("Failed to build thread pool")?;
        debug!("Using {} worker threads", n);
    }
    Ok(())
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_acquisition(path: &Path, label: &str, keys: &BandKeys) -> Result<Acquisition> {
    let pb = spinner(&format!("Reading {} acquisition...", label));
    let acquisition = Acquisition::from_item_file(path, keys)
        .with_context(|| format!("Failed to load {} acquisition from {}", label, path.display()))?;
    pb.finish_and_clear();
    let (rows, cols) = acquisition.bands.red.shape();
    info!(
        "{}: {} ({}), {} x {}",
        label,
        acquisition.item.id,
        acquisition.datetime.format("%Y-%m-%d"),
        cols,
        rows
    );
    Ok(acquisition)
}

fn parse_compression(s: &str) -> Result<CompressionMethod> {
    match s.to_lowercase().as_str() {
        "deflate" | "zip" => Ok(CompressionMethod::Deflate),
        "lzw" => Ok(CompressionMethod::Lzw),
        "none" => Ok(CompressionMethod::None),
        _ => anyhow::bail!("Unknown compression: {}. Use deflate, lzw, or none.", s),
    }
}

fn report_counts(counts: &ClassCounts) {
    let total = counts.total().max(1) as f64;
    info!(
        "Not burned: {} ({:.1}%)",
        counts.not_burned,
        100.0 * counts.not_burned as f64 / total
    );
    info!("Burned: {} ({:.1}%)", counts.burned, 100.0 * counts.burned as f64 / total);
    info!("Invalid: {} ({:.1}%)", counts.invalid, 100.0 * counts.invalid as f64 / total);
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    setup_threads(cli.threads)?;

    match cli.command {
        Commands::Detect {
            pre_event,
            post_event,
            ndvi_threshold,
            ndwi_threshold,
            output_dir,
            compression,
        } => {
            let params = BurnedAreaParams::with_thresholds(ndvi_threshold, ndwi_threshold);
            params.validate().context("Invalid thresholds")?;
            let options = GeoTiffOptions::with_compression(parse_compression(&compression)?);

            let keys = BandKeys::default();
            let pre = load_acquisition(&pre_event, "Pre-event", &keys)?;
            let post = load_acquisition(&post_event, "Post-event", &keys)?;
            let name = output_name(&pre.datetime, &post.datetime);

            let start = Instant::now();
            let pb = spinner("Classifying burned area...");
            let input = BurnedAreaInput {
                pre: pre.bands,
                post: post.bands,
            };
            let result = BurnedArea
                .execute(input, params.clone())
                .context("Burned area detection failed")?;
            pb.finish_and_clear();
            report_counts(&ClassCounts::from_raster(&result));

            let pb = spinner("Writing catalog...");
            let writer = CatalogWriter::new(&output_dir, options);
            let product = writer
                .write(&name, &result, &pre.item, &params)
                .context("Failed to write output catalog")?;
            pb.finish_and_clear();
            debug!("Catalog: {}", product.catalog.display());
            debug!("Item: {}", product.item.display());

            done(&name, &product.raster, start.elapsed());
        }

        Commands::Info { input } => {
            let pb = spinner("Reading raster...");
            let raster: Raster<f64> = read_geotiff(&input, None).context("Failed to read raster")?;
            pb.finish_and_clear();

            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
            );
        }
    }

    Ok(())
}
