use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::time::Instant;

use common::CancelToken;
use imaginarium::Image;
use rayon::prelude::*;
use tracing::{debug, info};

use super::{LevelInfo, PyramidLayout, tile_path};
use crate::config::PyramidConfig;
use crate::error::{Error, Result};

/// What a pyramid build produced.
#[derive(Debug, Clone)]
pub struct PyramidStats {
    pub layout: PyramidLayout,
    pub levels_written: u32,
    pub tiles_written: u64,
}

/// Renders every level of `canvas` and writes its tiles under `tiles_dir`.
///
/// Levels are produced top-down, each by halving the previous one; only the
/// current level is held in memory besides the canvas. Tiles of a level are
/// encoded and written in parallel. `cancel` is polled before every level and
/// every tile.
pub fn build_pyramid(
    canvas: &Image,
    config: &PyramidConfig,
    tiles_dir: &Path,
    cancel: &CancelToken,
) -> Result<PyramidStats> {
    config.validate()?;
    let layout = PyramidLayout::for_config(canvas.width(), canvas.height(), config)?;

    let mut current = Cow::Borrowed(canvas);
    let mut levels_written = 0;
    let mut tiles_written = 0;

    for level in layout.levels().iter().rev() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled { level: level.level });
        }
        if !level.is_written(config.min_level_dim) {
            debug!(
                "Skipping levels {} and below, smaller than {} px",
                level.level, config.min_level_dim
            );
            break;
        }

        if level.level != layout.max_level() {
            current = Cow::Owned(current.downsample_half(config.filter)?);
        }
        debug_assert_eq!((current.width(), current.height()), (level.width, level.height));

        let start = Instant::now();
        write_level(&current, &layout, level, config, tiles_dir, cancel)?;

        info!(
            "Level {}: {}x{}, {} tiles in {:.2?}",
            level.level,
            level.width,
            level.height,
            level.tile_count(),
            start.elapsed()
        );

        levels_written += 1;
        tiles_written += level.tile_count();
    }

    Ok(PyramidStats {
        layout,
        levels_written,
        tiles_written,
    })
}

fn write_level(
    image: &Image,
    layout: &PyramidLayout,
    level: &LevelInfo,
    config: &PyramidConfig,
    tiles_dir: &Path,
    cancel: &CancelToken,
) -> Result<()> {
    let level_dir = tiles_dir.join(level.level.to_string());
    fs::create_dir_all(&level_dir).map_err(|e| Error::io(&level_dir, e))?;

    let tiles: Vec<(u32, u32)> = level.tiles().collect();
    tiles.par_iter().try_for_each(|&(col, row)| {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled { level: level.level });
        }
        write_tile(image, layout, level, col, row, config, tiles_dir)
    })
}

fn write_tile(
    image: &Image,
    layout: &PyramidLayout,
    level: &LevelInfo,
    col: u32,
    row: u32,
    config: &PyramidConfig,
    tiles_dir: &Path,
) -> Result<()> {
    let encode_err = |source| Error::Encode {
        level: level.level,
        col,
        row,
        source,
    };

    let bounds = layout.tile_bounds(level, col, row);
    let tile = image
        .crop(bounds.x, bounds.y, bounds.width, bounds.height)
        .map_err(encode_err)?;
    let bytes = tile
        .encode(config.format, config.quality)
        .map_err(encode_err)?;

    let path = tile_path(tiles_dir, level.level, col, row, config.format);
    fs::write(&path, bytes).map_err(|e| Error::io(&path, e))?;

    debug!(
        "Wrote {} ({}x{} at {}, {})",
        path.display(),
        bounds.width,
        bounds.height,
        bounds.x,
        bounds.y
    );

    Ok(())
}
