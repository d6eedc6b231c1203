//! Dry-run planning: everything a build would produce, computed without IO.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{CellSize, DeepZoomConfig};
use crate::error::{Error, Result};
use crate::montage::{self, CellPlacement};
use crate::pyramid::{LevelInfo, PyramidLayout, tile_path};

/// A source image's cell and the full-size tiles that show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSource {
    pub placement: CellPlacement,
    pub top_tiles: Vec<PathBuf>,
}

/// Output of [`plan`].
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub montage_width: u32,
    pub montage_height: u32,
    pub cell: CellSize,
    pub layout: PyramidLayout,
    pub sources: Vec<PlannedSource>,
    /// Levels that will be written, top level last.
    pub levels: Vec<LevelInfo>,
    pub tiles_dir: PathBuf,
    pub descriptor_path: PathBuf,
    pub tile_count: u64,
}

/// Computes the build for `inputs` as `run` would perform it.
///
/// The cell size must be configured, since no image is decoded.
pub fn plan(config: &DeepZoomConfig, inputs: &[PathBuf]) -> Result<BuildPlan> {
    config.validate()?;

    let cell = config
        .cell_size
        .ok_or_else(|| Error::config("planning without decoding needs an explicit cell size"))?;
    if inputs.is_empty() {
        return Err(Error::config("no source images to plan for"));
    }
    config.grid.check_capacity(inputs.len())?;

    let (montage_width, montage_height) = montage::canvas_size(config.grid, cell)?;
    let layout = PyramidLayout::for_config(montage_width, montage_height, &config.pyramid)?;

    let tiles_dir = config.tiles_dir();
    let paths: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
    let sources = montage::placements(config.grid, cell, &paths)
        .into_iter()
        .filter(|p| p.source.is_some())
        .map(|placement| {
            let top_tiles = covering_tiles(&layout, &placement, cell)
                .into_iter()
                .map(|(col, row)| {
                    tile_path(&tiles_dir, layout.max_level(), col, row, config.pyramid.format)
                })
                .collect();
            PlannedSource {
                placement,
                top_tiles,
            }
        })
        .collect();

    let levels: Vec<LevelInfo> = layout
        .written_levels(config.pyramid.min_level_dim)
        .copied()
        .collect();
    let tile_count = layout.tile_count(config.pyramid.min_level_dim);

    Ok(BuildPlan {
        montage_width,
        montage_height,
        cell,
        layout,
        sources,
        levels,
        tiles_dir,
        descriptor_path: config.descriptor_path(),
        tile_count,
    })
}

/// Full-size tiles whose nominal area intersects the placement's cell.
fn covering_tiles(layout: &PyramidLayout, placement: &CellPlacement, cell: CellSize) -> Vec<(u32, u32)> {
    let ts = layout.tile_size();
    let first_col = placement.x / ts;
    let last_col = (placement.x + cell.width - 1) / ts;
    let first_row = placement.y / ts;
    let last_row = (placement.y + cell.height - 1) / ts;

    (first_row..=last_row)
        .flat_map(|row| (first_col..=last_col).map(move |col| (col, row)))
        .collect()
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Montage {}x{} ({}x{} cells)",
            self.montage_width, self.montage_height, self.cell.width, self.cell.height
        )?;
        for source in &self.sources {
            let p = &source.placement;
            let path = p.source.as_deref().unwrap_or(Path::new(""));
            writeln!(
                f,
                "  {} -> cell ({}, {}) at ({}, {}), {} tile(s)",
                path.display(),
                p.col,
                p.row,
                p.x,
                p.y,
                source.top_tiles.len()
            )?;
            for tile in &source.top_tiles {
                writeln!(f, "      {}", tile.display())?;
            }
        }
        for level in self.levels.iter().rev() {
            writeln!(
                f,
                "Level {:>2}: {}x{}, {}x{} tiles",
                level.level, level.width, level.height, level.columns, level.rows
            )?;
        }
        writeln!(f, "Tiles: {} under {}", self.tile_count, self.tiles_dir.display())?;
        write!(f, "Descriptor: {}", self.descriptor_path.display())
    }
}
