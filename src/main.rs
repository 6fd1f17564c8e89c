use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use morph_dehaze::dehaze::buffer::{save_gray, save_rgb};
use morph_dehaze::dehaze::params::{DEFAULT_KERNEL_SIZE, DEFAULT_OMEGA, DEFAULT_T_MIN};
use morph_dehaze::filters::grayscale::map_to_u8;
use morph_dehaze::{dehaze, gray_histogram, morphology_demo, DehazeParams, DehazeResult, Histogram};

/// Remove haze from a single image
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the hazy input image
    input: PathBuf,

    /// Output path (default: <input stem>_dehazed.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Structuring element size; even values are rounded up
    #[arg(short, long, default_value_t = DEFAULT_KERNEL_SIZE)]
    kernel_size: usize,

    /// Haze removal strength, in (0, 1)
    #[arg(long, default_value_t = DEFAULT_OMEGA)]
    omega: f32,

    /// Lower bound of the refined transmission, in [0, 1]
    #[arg(long, default_value_t = DEFAULT_T_MIN)]
    t_min: f32,

    /// Also write intermediate maps, morphology previews and histograms here
    #[arg(long)]
    maps_dir: Option<PathBuf>,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}_dehazed.png", stem))
}

fn write_maps(dir: &Path, result: &DehazeResult) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    save_gray(dir.join("gray.png"), &result.original_gray().to_owned())?;
    save_gray(dir.join("dark_channel.png"), &map_to_u8(result.dark_channel()))?;
    save_gray(
        dir.join("transmission_initial.png"),
        &map_to_u8(result.transmission_initial()),
    )?;
    save_gray(
        dir.join("transmission_refined.png"),
        &map_to_u8(result.transmission_refined()),
    )?;

    let demo = morphology_demo(result.original_gray(), result.params().kernel_size)?;
    save_gray(dir.join("gray_eroded.png"), &demo.eroded)?;
    save_gray(dir.join("gray_dilated.png"), &demo.dilated)?;
    save_gray(dir.join("gray_opened.png"), &demo.opened)?;
    save_gray(dir.join("gray_closed.png"), &demo.closed)?;

    let gray_hist = gray_histogram(result.original_gray());
    fs::write(dir.join("gray_histogram.csv"), gray_hist.to_csv())
        .context("writing gray histogram")?;
    let restored_hist = Histogram::of_color(result.restored_color());
    fs::write(dir.join("restored_histogram.csv"), restored_hist.to_csv())
        .context("writing restored histogram")?;

    info!(dir = %dir.display(), "intermediate maps written");
    Ok(())
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let args = Args::parse();

    let requested = DehazeParams::new(args.kernel_size, args.omega, args.t_min);
    let params = requested.with_coerced_kernel();
    if params.kernel_size != requested.kernel_size {
        warn!(
            requested = requested.kernel_size,
            used = params.kernel_size,
            "kernel size must be odd, rounded up"
        );
    }

    let result = dehaze(&args.input, &params)
        .with_context(|| format!("dehazing {}", args.input.display()))?;

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    save_rgb(&output, result.restored_color())?;
    info!(
        output = %output.display(),
        light = ?result.atmospheric_light().channels(),
        "restored image written"
    );

    if let Some(dir) = args.maps_dir.as_deref() {
        write_maps(dir, &result)?;
    }
    Ok(())
}
