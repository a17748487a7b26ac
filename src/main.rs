use anyhow::Context;
use clap::Parser;
use log::{LevelFilter, info};
use std::path::PathBuf;

use retinacrop::config::init_logging;
use retinacrop::{BatchRunner, CropConfig, RetinaCropper, RtenSegmentationModel};

#[derive(Parser)]
#[command(name = "retinacrop")]
#[command(about = "Crop the retina out of fundus photographs using a segmentation model")]
struct Cli {
    /// Directory with the source images
    #[arg(short = 'i', long = "input", value_name = "DIR")]
    source: PathBuf,

    /// Destination root; crops and masks go to separate subdirectories
    #[arg(short = 'd', long = "dest", value_name = "DIR")]
    destination: PathBuf,

    /// Segmentation model file (.rten)
    #[arg(short = 'm', long = "model", value_name = "FILE")]
    model: PathBuf,

    /// Square resolution the model runs at
    #[arg(short = 's', long = "size", value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,

    /// Optional settings JSON (threshold, erosion, filtering, output names)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging(LevelFilter::Info);
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => CropConfig::load_from_path(path)?,
        None => CropConfig::default(),
    };

    anyhow::ensure!(
        args.source.is_dir(),
        "source directory does not exist: {}",
        args.source.display()
    );

    info!("Loading segmentation model from {}", args.model.display());
    let model = RtenSegmentationModel::load(&args.model)?;

    let cropper = RetinaCropper::new(config, args.size)?;
    let runner = BatchRunner::with_destination(cropper, &args.destination)?;
    let report = runner.run(&args.source, &model)?;

    let summary =
        serde_json::to_string_pretty(&report.summary()).context("failed to serialize summary")?;
    println!("{summary}");

    Ok(())
}
