//! floodimpact CLI - compare simulated and observed flood extents

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use floodimpact_algorithms::align::{align_to, ResampleMethod};
use floodimpact_algorithms::contingency::{
    count_flooded, evaluate, evaluate_many, ContingencyParams, ContingencyResult,
    ContingencyTable,
};
use floodimpact_algorithms::impact::exposure;
use floodimpact_core::io::{read_geotiff, write_geotiff, GeoTiffOptions};
use floodimpact_core::Raster;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "floodimpact")]
#[command(author, version, about = "Flood extent contingency analysis and population exposure", long_about = None)]
struct Cli {
    /// Debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Resample a raster (DR) to the resolution and extent of another raster (SR)
    ResampleTiff {
        /// Raster that will be resampled
        dr: PathBuf,
        /// Raster whose resolution and extent are used
        sr: PathBuf,
        /// Output file, may include a relative path
        #[arg(short, long, default_value = "./resample_tiff_out.tiff")]
        output_name: PathBuf,
        /// Resampling method: nearest, bilinear
        #[arg(short, long, default_value = "nearest")]
        method: String,
        /// Show source and warped rasters
        #[arg(long)]
        plot: bool,
    },
    /// Contingency map and scores between an observed and a simulated extent
    GetContingency {
        /// Observed flood extent
        obs: PathBuf,
        /// Simulated flood extent (same grid as OBS)
        sim: PathBuf,
        #[command(flatten)]
        thresholds: Thresholds,
        /// Output directory
        #[arg(short, long, default_value = "./OUT")]
        output_directory: PathBuf,
        /// File name of the category map inside the output directory
        #[arg(long, default_value = "contingency_map.tif")]
        output_name: String,
        /// Show the contingency map
        #[arg(long)]
        plot: bool,
    },
    /// Score several simulated extents against one observed extent
    Compare {
        /// Observed flood extent
        obs: PathBuf,
        /// Simulated flood extents
        #[arg(required = true)]
        sims: Vec<PathBuf>,
        #[command(flatten)]
        thresholds: Thresholds,
        /// Resample each simulation onto the observed grid first
        #[arg(long)]
        align: bool,
        /// Write the scores as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Population living in flooded cells, per flood extent
    Exposure {
        /// Population count raster
        population: PathBuf,
        /// Flood extent rasters
        #[arg(required = true)]
        extents: Vec<PathBuf>,
        /// A cell is flooded when its value exceeds this threshold
        #[arg(short, long, default_value = "0")]
        threshold: f64,
        /// Resample each extent onto the population grid first
        #[arg(long)]
        align: bool,
    },
}

#[derive(clap::Args)]
struct Thresholds {
    /// Observed values above this count as flooded
    #[arg(long, default_value = "0.5")]
    observation_threshold: f64,
    /// Simulated values above this count as flooded
    #[arg(long, default_value = "0")]
    simulation_threshold: f64,
}

impl From<&Thresholds> for ContingencyParams {
    fn from(t: &Thresholds) -> Self {
        ContingencyParams {
            benchmark_threshold: t.observation_threshold,
            model_threshold: t.simulation_threshold,
        }
    }
}

/// One row of the `compare` report
#[derive(Serialize)]
struct ScoreRow {
    name: String,
    hit_rate: Option<f64>,
    false_alarm_rate: Option<f64>,
    critical_success_index: Option<f64>,
    table: ContingencyTable,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
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

fn read_raster(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner(&format!("Reading {}...", path.display()));
    let raster: Raster<f64> = read_geotiff(path, None)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    debug!(
        "{}: {} x {}, bounds {}, resolution {:?}, nodata {:?}",
        path.display(),
        raster.cols(),
        raster.rows(),
        raster.bounds(),
        raster.resolution(),
        raster.nodata()
    );
    Ok(raster)
}

fn write_result(raster: &Raster<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path, None).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn write_category_map(raster: &Raster<u8>, path: &Path) -> Result<()> {
    let pb = spinner("Writing contingency map...");
    write_geotiff(raster, path, Some(GeoTiffOptions::uint8()))
        .context("Failed to write contingency map")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_method(s: &str) -> Result<ResampleMethod> {
    match s.to_lowercase().as_str() {
        "nearest" | "near" | "nn" => Ok(ResampleMethod::Nearest),
        "bilinear" | "linear" => Ok(ResampleMethod::Bilinear),
        _ => anyhow::bail!("Unknown resampling method: {}. Use nearest or bilinear.", s),
    }
}

fn fmt_score(score: Option<f64>) -> String {
    match score {
        Some(v) => format!("{:.6}", v),
        None => "undefined".to_string(),
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn skip_plot(plot: bool) {
    if plot {
        warn!("--plot: preview rendering is not available, no plot produced");
    }
}

fn print_scores(result: &ContingencyResult) {
    println!("  Hit rate:               {}", fmt_score(result.hit_rate));
    println!("  False alarm ratio:      {}", fmt_score(result.false_alarm_rate));
    println!("  Critical success index: {}", fmt_score(result.critical_success_index));
}

/// Read every simulation, optionally resampled onto the observed grid
fn read_models(paths: &[PathBuf], reference: &Raster<f64>, align: bool) -> Result<Vec<Raster<f64>>> {
    paths
        .iter()
        .map(|path| {
            let raster = read_raster(path)?;
            if !align {
                return Ok(raster);
            }
            info!("Aligning {} to the reference grid", path.display());
            align_to(&raster, reference, ResampleMethod::Nearest)
                .with_context(|| format!("Failed to align {}", path.display()))
        })
        .collect()
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);
    debug!("Debug mode is on");

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let (xres, yres) = raster.resolution();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Resolution: {} x {}", xres, yres);
            println!("Bounds: {}", raster.bounds());
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
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }

        // ── Resample ─────────────────────────────────────────────────
        Commands::ResampleTiff {
            dr,
            sr,
            output_name,
            method,
            plot,
        } => {
            let method = parse_method(&method)?;
            info!("Reading source raster {}", sr.display());
            let reference = read_raster(&sr)?;
            let bounds = reference.bounds();
            let (xres, yres) = reference.resolution();
            debug!(
                "Target bounds xmin={}, ymin={}, xmax={}, ymax={}",
                bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax
            );
            debug!("Target resolution x={}, y={}", xres, yres);

            info!("Reading destination raster {}", dr.display());
            let source = read_raster(&dr)?;

            let start = Instant::now();
            let warped = align_to(&source, &reference, method).context("Failed to resample raster")?;
            let elapsed = start.elapsed();
            debug!("Geotransform of warped raster: {:?}", warped.transform().to_gdal());

            write_result(&warped, &output_name)?;
            done("Resampled raster", &output_name, elapsed);
            skip_plot(plot);
        }

        // ── Contingency ──────────────────────────────────────────────
        Commands::GetContingency {
            obs,
            sim,
            thresholds,
            output_directory,
            output_name,
            plot,
        } => {
            info!("Reading observed flood extent from {}", obs.display());
            let observed = read_raster(&obs)?;
            info!("Reading simulated flood extent from {}", sim.display());
            let simulated = read_raster(&sim)?;

            info!("Computing contingency data");
            let start = Instant::now();
            let result = evaluate(&observed, &simulated, &ContingencyParams::from(&thresholds))
                .context("Failed to compute contingency")?;
            let elapsed = start.elapsed();
            debug!(
                "Flooded cells: observed={}, simulated={}",
                count_flooded(&result.benchmark_mask),
                count_flooded(&result.model_mask)
            );
            debug!("Contingency table: {:?}", result.table);
            print_scores(&result);

            std::fs::create_dir_all(&output_directory).with_context(|| {
                format!("Failed to create output directory {}", output_directory.display())
            })?;
            let path = output_directory.join(output_name);
            write_category_map(&result.category_map, &path)?;
            done("Contingency map", &path, elapsed);
            skip_plot(plot);
        }

        // ── Compare ──────────────────────────────────────────────────
        Commands::Compare {
            obs,
            sims,
            thresholds,
            align,
            report,
        } => {
            let observed = read_raster(&obs)?;
            let models = read_models(&sims, &observed, align)?;

            let start = Instant::now();
            let results = evaluate_many(&observed, &models, &ContingencyParams::from(&thresholds))
                .context("Failed to compute contingency")?;
            info!("Scored {} simulation(s) in {:.2?}", results.len(), start.elapsed());

            let rows: Vec<ScoreRow> = sims
                .iter()
                .zip(&results)
                .map(|(path, result)| ScoreRow {
                    name: file_label(path),
                    hit_rate: result.hit_rate,
                    false_alarm_rate: result.false_alarm_rate,
                    critical_success_index: result.critical_success_index,
                    table: result.table,
                })
                .collect();

            println!("{:<32} {:>12} {:>12} {:>12}", "Model", "HR", "FAR", "CSI");
            for row in &rows {
                println!(
                    "{:<32} {:>12} {:>12} {:>12}",
                    row.name,
                    fmt_score(row.hit_rate),
                    fmt_score(row.false_alarm_rate),
                    fmt_score(row.critical_success_index)
                );
            }

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&rows).context("Failed to serialize report")?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                println!("Report saved to: {}", path.display());
            }
        }

        // ── Exposure ─────────────────────────────────────────────────
        Commands::Exposure {
            population,
            extents,
            threshold,
            align,
        } => {
            let pop = read_raster(&population)?;
            let floods = read_models(&extents, &pop, align)?;

            for (path, flood) in extents.iter().zip(&floods) {
                let people = exposure(flood, threshold, &pop)
                    .with_context(|| format!("Failed to overlay {}", path.display()))?;
                println!("{:<32} {:>16.1}", file_label(path), people);
            }
        }
    }

    Ok(())
}
