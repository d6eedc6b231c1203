//! End-to-end build: inputs on disk to tiles and descriptor on disk.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::CancelToken;
use common::file_utils::{files_with_extensions, remove_dir_if_exists, remove_file_if_exists};
use common::parallel::try_par_map_limited;
use imaginarium::EncodeFormat;
use tracing::{info, warn};

use crate::config::{CellSize, DeepZoomConfig, DescriptorFormat};
use crate::descriptor::PyramidDescriptor;
use crate::error::{Error, Result};
use crate::montage::{self, Montage, SourceImage};
use crate::pyramid::build_pyramid;

/// Result of a completed [`run`].
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub montage_width: u32,
    pub montage_height: u32,
    pub sources: usize,
    pub levels_written: u32,
    pub tiles_written: u64,
    pub descriptor_path: PathBuf,
    pub elapsed: Duration,
}

/// Source files in `config.input_dir`, sorted by file name.
pub fn list_inputs(config: &DeepZoomConfig) -> Result<Vec<PathBuf>> {
    let files = files_with_extensions(&config.input_dir, &[config.input_extension()])
        .map_err(|e| Error::io(&config.input_dir, e))?;

    if files.is_empty() {
        return Err(Error::config(format!(
            "no .{} files in {}",
            config.input_extension(),
            config.input_dir.display()
        )));
    }

    Ok(files)
}

/// Builds the whole pyramid described by `config`.
///
/// Any previous descriptor is deleted before its tiles, and the new one is
/// written only after every tile, so a failed or cancelled run never leaves a
/// descriptor pointing at an incomplete tile tree.
pub fn run(config: &DeepZoomConfig, cancel: &CancelToken) -> Result<BuildSummary> {
    let start = Instant::now();
    config.validate()?;

    let inputs = list_inputs(config)?;
    config.grid.check_capacity(inputs.len())?;
    info!(
        "Found {} source image(s) in {}",
        inputs.len(),
        config.input_dir.display()
    );

    let sources = try_par_map_limited(&inputs, config.max_concurrent_decodes, |path| {
        SourceImage::load(path)
    })?;
    let cell = resolve_cell_size(config, &sources[0]);

    let montage = montage::assemble(&sources, config.grid, cell, config.background)?;
    drop(sources);
    info!(
        "Montage {}x{}: {}x{} grid of {}x{} cells",
        montage.width(),
        montage.height(),
        config.grid.cols,
        config.grid.rows,
        cell.width,
        cell.height
    );

    fs::create_dir_all(&config.output_dir).map_err(|e| Error::io(&config.output_dir, e))?;
    remove_stale_outputs(config)?;

    if config.keep_montage {
        save_montage(&montage, config)?;
    }

    let tiles_dir = config.tiles_dir();
    let stats = build_pyramid(&montage.image, &config.pyramid, &tiles_dir, cancel)?;

    let descriptor_path = config.descriptor_path();
    PyramidDescriptor::new(&stats.layout, config.pyramid.format)
        .write(&descriptor_path, config.descriptor)?;

    let summary = BuildSummary {
        montage_width: montage.width(),
        montage_height: montage.height(),
        sources: inputs.len(),
        levels_written: stats.levels_written,
        tiles_written: stats.tiles_written,
        descriptor_path,
        elapsed: start.elapsed(),
    };
    info!(
        "Wrote {} tiles in {} levels, descriptor {} ({:.2?})",
        summary.tiles_written,
        summary.levels_written,
        summary.descriptor_path.display(),
        summary.elapsed
    );

    Ok(summary)
}

fn remove_stale_outputs(config: &DeepZoomConfig) -> Result<()> {
    // Either encoding may be left from an earlier run
    for format in [DescriptorFormat::Xml, DescriptorFormat::Json] {
        let descriptor = config.descriptor_path_for(format);
        if remove_file_if_exists(&descriptor).map_err(|e| Error::io(&descriptor, e))? {
            warn!("Removed previous descriptor {}", descriptor.display());
        }
    }

    let tiles_dir = config.tiles_dir();
    if remove_dir_if_exists(&tiles_dir).map_err(|e| Error::io(&tiles_dir, e))? {
        warn!("Removed previous tiles in {}", tiles_dir.display());
    }

    Ok(())
}

fn save_montage(montage: &Montage, config: &DeepZoomConfig) -> Result<()> {
    let path = config.montage_path();
    let bytes = montage
        .image
        .encode(EncodeFormat::Png, config.pyramid.quality)?;
    fs::write(&path, bytes).map_err(|e| Error::io(&path, e))?;
    info!("Saved montage to {}", path.display());
    Ok(())
}

/// Configured cell size, or the size of the first source.
fn resolve_cell_size(config: &DeepZoomConfig, first: &SourceImage) -> CellSize {
    config.cell_size.unwrap_or_else(|| first.size())
}
