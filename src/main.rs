use clap::{Parser, Subcommand};
use focal_crop::config::{self, CropConfig};
use focal_crop::cropping::{PlanRequest, plan_crops, plan_many};
use focal_crop::output;
use focal_crop::types::{FocusPoint, ImageId, SourceImage};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "focal-crop")]
#[command(about = "Focus-point crop rectangles for thumbnail sizes")]
#[command(long_about = "\
Focus-point crop rectangles for thumbnail sizes

Given an image's dimensions and a focus point (percent from the top-left
corner), computes for every registered hard-cropped size the region of the
original to cut out, keeping the focus point as centered as the image
bounds allow. Pixels are never touched; the rectangles are meant for an
external resampler.

Sizes come from focal-crop.toml (run 'focal-crop gen-config' for a
documented template). Without a config file the stock registry is used.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "focal-crop.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute crop rectangles for one image
    Plan {
        /// Source width in pixels
        #[arg(long)]
        width: u32,
        /// Source height in pixels
        #[arg(long)]
        height: u32,
        /// Focus point as X,Y percentages (defaults to the configured focus)
        #[arg(long, value_parser = parse_focus)]
        focus: Option<FocusPoint>,
        /// Upload-relative path of the original, used to name derivatives
        #[arg(long)]
        file: Option<PathBuf>,
        /// Image identifier shown in the output
        #[arg(long, default_value_t = 0)]
        id: u64,
        /// Print JSON instead of the text tree
        #[arg(long)]
        json: bool,
    },
    /// Plan many images from a JSON array on stdin
    Batch {
        /// Print JSON instead of the text tree
        #[arg(long)]
        json: bool,
    },
    /// Validate the config and list the registered sizes
    Check,
    /// Print a stock focal-crop.toml with all options documented
    GenConfig,
}

/// One element of the `batch` input array.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchEntry {
    id: u64,
    width: u32,
    height: u32,
    #[serde(default)]
    focus: Option<FocusPoint>,
    #[serde(default)]
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan {
            width,
            height,
            focus,
            file,
            id,
            json,
        } => {
            let site = config::load_config(&cli.config)?;
            let focus = match focus {
                Some(focus) => focus,
                None => site.default_focus()?,
            };
            let source = SourceImage::new(ImageId(id), width, height);
            let plan = plan_crops(
                &source,
                focus,
                &site.sizes,
                file.as_deref(),
                Path::new(&site.upload_dir),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                let label = file.as_ref().map(|f| f.display().to_string());
                output::print_plan(&plan, label.as_deref());
            }
        }
        Command::Batch { json } => {
            let site = config::load_config(&cli.config)?;
            init_thread_pool(&site);
            let default_focus = site.default_focus()?;

            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            let entries: Vec<BatchEntry> = serde_json::from_str(&input)?;

            let requests: Vec<PlanRequest> = entries
                .into_iter()
                .map(|entry| PlanRequest {
                    source: SourceImage::new(ImageId(entry.id), entry.width, entry.height),
                    focus: entry.focus.unwrap_or(default_focus),
                    attached: entry.file,
                })
                .collect();
            let plans = plan_many(&requests, &site.sizes, Path::new(&site.upload_dir));

            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                for (request, plan) in requests.iter().zip(&plans) {
                    let label = request
                        .attached
                        .as_ref()
                        .map(|f| f.display().to_string());
                    output::print_plan(plan, label.as_deref());
                }
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.config.display());
            let site = config::load_config(&cli.config)?;
            output::print_sizes(&site.sizes);
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Parse `X,Y` into a clamped focus point.
fn parse_focus(value: &str) -> Result<FocusPoint, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad Y '{y}': {e}"))?;
    FocusPoint::new(x, y).map_err(|e| e.to_string())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(site: &CropConfig) {
    let threads = config::effective_threads(&site.processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
