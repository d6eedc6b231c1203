//! Grid montage assembly.
//!
//! Places equal-sized source images on a `cols x rows` canvas in row-major
//! order. The canvas is exactly `cols * cell_width` by `rows * cell_height`;
//! cells without a source keep the background color.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use imaginarium::{ChannelCount, ChannelSize, ChannelType, Color, ColorFormat, Image, ImageDesc};
use tracing::debug;

use crate::config::{CellSize, GridSpec};
use crate::error::{Error, Result};

/// A decoded source raster and the file it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub image: Image,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, image: Image) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// Decodes `path`, reducing 16-bit and float rasters to 8 bits per channel.
    pub fn load(path: &Path) -> Result<Self> {
        let decode_err = |source| Error::Decode {
            path: path.to_path_buf(),
            source,
        };

        let mut image = Image::read_file(path).map_err(decode_err)?;

        let format = image.desc().color_format;
        if !format.is_u8() {
            let target = ColorFormat::from((
                format.channel_count,
                ChannelSize::_8bit,
                ChannelType::UInt,
            ));
            image = image.convert(target).map_err(decode_err)?;
        }

        debug!("Decoded {} ({})", path.display(), image.desc());

        Ok(Self::new(path, image))
    }

    pub fn size(&self) -> CellSize {
        CellSize::new(self.image.width(), self.image.height())
    }
}

/// Where one grid cell sits on the canvas and which source fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPlacement {
    pub index: usize,
    pub col: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
    /// `None` for cells left blank.
    pub source: Option<PathBuf>,
}

/// Assembled canvas plus the cell to source mapping.
#[derive(Debug)]
pub struct Montage {
    pub image: Image,
    pub grid: GridSpec,
    pub cell: CellSize,
    /// One entry per grid cell, row-major.
    pub placements: Vec<CellPlacement>,
}

impl Montage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Placements that received a source image.
    pub fn filled(&self) -> impl Iterator<Item = &CellPlacement> {
        self.placements.iter().filter(|p| p.source.is_some())
    }
}

/// Canvas size for `grid` cells of size `cell`, or a config error on overflow.
pub fn canvas_size(grid: GridSpec, cell: CellSize) -> Result<(u32, u32)> {
    let width = grid.cols.checked_mul(cell.width);
    let height = grid.rows.checked_mul(cell.height);

    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(Error::config(format!(
            "{}x{} cells of {}x{} exceed the maximum canvas size",
            grid.cols, grid.rows, cell.width, cell.height
        ))),
    }
}

/// Pixel layout of the canvas: alpha is kept only when the background needs it.
pub fn canvas_format(background: Color) -> ColorFormat {
    if background.is_opaque() {
        ColorFormat::RGB_U8
    } else {
        ColorFormat::RGBA_U8
    }
}

/// Row-major placements of every cell; the first `sources.len()` get a source.
pub fn placements(grid: GridSpec, cell: CellSize, sources: &[&Path]) -> Vec<CellPlacement> {
    (0..grid.capacity() as usize)
        .map(|index| {
            let (col, row) = grid.cell_of(index);
            CellPlacement {
                index,
                col,
                row,
                x: col * cell.width,
                y: row * cell.height,
                source: sources.get(index).map(|p| p.to_path_buf()),
            }
        })
        .collect()
}

/// Composites `images` onto a fresh canvas. Performs no file IO.
pub fn assemble(
    images: &[SourceImage],
    grid: GridSpec,
    cell: CellSize,
    background: Color,
) -> Result<Montage> {
    grid.validate()?;
    cell.validate()?;
    if images.is_empty() {
        return Err(Error::config("no source images to assemble"));
    }
    grid.check_capacity(images.len())?;

    for source in images {
        if source.size() != cell {
            return Err(Error::InputMismatch {
                path: source.path.clone(),
                expected_width: cell.width,
                expected_height: cell.height,
                width: source.image.width(),
                height: source.image.height(),
            });
        }
    }

    let (width, height) = canvas_size(grid, cell)?;
    let format = canvas_format(background);
    let mut canvas = Image::new_filled(ImageDesc::new(width, height, format), background)?;

    let paths: Vec<&Path> = images.iter().map(|s| s.path.as_path()).collect();
    let placements = placements(grid, cell, &paths);

    for (source, placement) in images.iter().zip(&placements) {
        let pixels = to_canvas_format(&source.image, format)?;
        canvas.blit(&pixels, placement.x, placement.y)?;
        debug!(
            "Placed {} at cell ({}, {})",
            source.path.display(),
            placement.col,
            placement.row
        );
    }

    Ok(Montage {
        image: canvas,
        grid,
        cell,
        placements,
    })
}

fn to_canvas_format(image: &Image, format: ColorFormat) -> Result<Cow<'_, Image>> {
    if image.desc().color_format == format {
        return Ok(Cow::Borrowed(image));
    }

    debug_assert!(matches!(
        format.channel_count,
        ChannelCount::Rgb | ChannelCount::Rgba
    ));
    Ok(Cow::Owned(image.clone().convert(format)?))
}
