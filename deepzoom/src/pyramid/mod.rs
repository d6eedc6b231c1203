//! Deep Zoom pyramid geometry and tile generation.
//!
//! Level `max_level` is the full-size canvas; each lower level halves the one
//! above it (rounding up) down to a 1x1 level 0. Every level is cut into
//! `tile_size` tiles that extend `overlap` pixels into their neighbours.

mod builder;

use std::path::{Path, PathBuf};

use imaginarium::EncodeFormat;

use crate::config::PyramidConfig;
use crate::error::{Error, Result};

pub use builder::{PyramidStats, build_pyramid};

/// `ceil(log2(max(width, height)))`, 0 for a 1x1 image.
pub fn max_level(width: u32, height: u32) -> u32 {
    let longest = width.max(height);
    if longest <= 1 {
        0
    } else {
        u32::BITS - (longest - 1).leading_zeros()
    }
}

/// Size of `level` for a full-size image at `max_level`.
pub fn level_size(width: u32, height: u32, max_level: u32, level: u32) -> (u32, u32) {
    debug_assert!(level <= max_level);
    let shift = max_level - level;
    let scale = |v: u32| (((v as u64) + (1u64 << shift) - 1) >> shift) as u32;
    (scale(width), scale(height))
}

/// Start and length of tile `index` along one axis of length `extent`.
fn tile_span(index: u32, tile_size: u32, overlap: u32, extent: u32) -> (u32, u32) {
    let (index, tile_size, overlap, extent) =
        (index as u64, tile_size as u64, overlap as u64, extent as u64);

    let start = index * tile_size - if index == 0 { 0 } else { overlap };
    let len = tile_size + if index == 0 { 1 } else { 2 } * overlap;

    (start as u32, len.min(extent - start) as u32)
}

/// `<tiles_dir>/<level>/<col>_<row>.<ext>`
pub fn tile_path(tiles_dir: &Path, level: u32, col: u32, row: u32, format: EncodeFormat) -> PathBuf {
    tiles_dir
        .join(level.to_string())
        .join(format!("{}_{}.{}", col, row, format.extension()))
}

/// Pixel region of one tile within its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One pyramid level: its size and tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl LevelInfo {
    pub fn tile_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Whether the level is large enough to be written.
    pub fn is_written(&self, min_level_dim: u32) -> bool {
        self.width.max(self.height) >= min_level_dim
    }

    /// `(col, row)` of every tile, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32)> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |col| (col, row)))
    }
}

/// Geometry of a whole pyramid, shared by planning and building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidLayout {
    width: u32,
    height: u32,
    tile_size: u32,
    overlap: u32,
    levels: Vec<LevelInfo>,
}

impl PyramidLayout {
    pub fn new(width: u32, height: u32, tile_size: u32, overlap: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::config(format!(
                "pyramid source must be non-empty, got {}x{}",
                width, height
            )));
        }
        if tile_size == 0 {
            return Err(Error::config("tile size must be positive"));
        }

        let max = max_level(width, height);
        let levels = (0..=max)
            .map(|level| {
                let (w, h) = level_size(width, height, max, level);
                LevelInfo {
                    level,
                    width: w,
                    height: h,
                    columns: w.div_ceil(tile_size),
                    rows: h.div_ceil(tile_size),
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            tile_size,
            overlap,
            levels,
        })
    }

    pub fn for_config(width: u32, height: u32, config: &PyramidConfig) -> Result<Self> {
        Self::new(width, height, config.tile_size, config.overlap)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32 - 1
    }

    /// All levels, from 0 (1x1) up to the full-size level.
    pub fn levels(&self) -> &[LevelInfo] {
        &self.levels
    }

    pub fn level(&self, level: u32) -> Option<&LevelInfo> {
        self.levels.get(level as usize)
    }

    pub fn written_levels(&self, min_level_dim: u32) -> impl Iterator<Item = &LevelInfo> {
        self.levels.iter().filter(move |l| l.is_written(min_level_dim))
    }

    /// Number of tile files a build writes.
    pub fn tile_count(&self, min_level_dim: u32) -> u64 {
        self.written_levels(min_level_dim).map(LevelInfo::tile_count).sum()
    }

    pub fn tile_bounds(&self, level: &LevelInfo, col: u32, row: u32) -> TileBounds {
        debug_assert!(col < level.columns && row < level.rows);

        let (x, width) = tile_span(col, self.tile_size, self.overlap, level.width);
        let (y, height) = tile_span(row, self.tile_size, self.overlap, level.height);

        TileBounds {
            x,
            y,
            width,
            height,
        }
    }
}
