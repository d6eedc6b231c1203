mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use common::log_setup::setup_logging;
use deepzoom::{CancelToken, DeepZoomConfig, SourceImage, list_inputs, plan, run};
use tracing::info;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    setup_logging(log_level, cli.log_dir.as_deref())?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let config = cli.to_config().context("Invalid arguments")?;
    config.validate()?;

    if cli.dry_run {
        return print_plan(config);
    }

    let summary = run(&config, &CancelToken::new()).context("Building the Deep Zoom pyramid failed")?;

    println!(
        "{}x{} montage of {} image(s): {} tiles in {} levels, descriptor {} ({:.2?})",
        summary.montage_width,
        summary.montage_height,
        summary.sources,
        summary.tiles_written,
        summary.levels_written,
        summary.descriptor_path.display(),
        summary.elapsed
    );

    Ok(())
}

fn print_plan(mut config: DeepZoomConfig) -> Result<()> {
    let inputs = list_inputs(&config)?;

    // Without --imdim only the first image is decoded to learn the cell size
    if config.cell_size.is_none() {
        let first = SourceImage::load(&inputs[0])?;
        info!("Cell size {}x{} from {}", first.image.width(), first.image.height(), first.path.display());
        config.cell_size = Some(first.size());
    }

    let plan = plan(&config, &inputs)?;
    println!("{}", plan);

    Ok(())
}
