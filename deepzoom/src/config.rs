//! Build configuration.
//!
//! [`DeepZoomConfig`] is the single explicit input of a run; nothing is read
//! from the working directory or environment. It can be loaded from a YAML or
//! JSON file and every field has a default.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use imaginarium::{Color, EncodeFormat, ResampleFilter};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_TILE_SIZE: u32 = 254;
pub const DEFAULT_OVERLAP: u32 = 1;
pub const DEFAULT_NAME: &str = "dzi";

/// Montage grid: `cols` cells across, `rows` cells down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { cols: 3, rows: 3 }
    }
}

impl GridSpec {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// Number of cells in the grid.
    pub fn capacity(&self) -> u64 {
        self.cols as u64 * self.rows as u64
    }

    /// Grid cell `(col, row)` of the image at `index`, in row-major order.
    pub fn cell_of(&self, index: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        ((index % cols) as u32, (index / cols) as u32)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(Error::config(format!(
                "grid must have at least one column and row, got {}x{}",
                self.cols, self.rows
            )));
        }
        Ok(())
    }

    /// Fails with [`Error::Capacity`] when `images` do not fit.
    pub fn check_capacity(&self, images: usize) -> Result<()> {
        if images as u64 > self.capacity() {
            return Err(Error::Capacity {
                images,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

/// Size of one montage cell; every source image must match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::config(format!(
                "cell size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Encoding of the pyramid descriptor file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorFormat {
    /// `<name>.dzi`, the XML form every Deep Zoom viewer reads.
    #[default]
    Xml,
    /// `<name>.json`, the JSON rendition of the same document.
    Json,
}

impl DescriptorFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DescriptorFormat::Xml => "dzi",
            DescriptorFormat::Json => "json",
        }
    }
}

impl FromStr for DescriptorFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xml" | "dzi" => Ok(DescriptorFormat::Xml),
            "json" => Ok(DescriptorFormat::Json),
            _ => Err(Error::config(format!("unknown descriptor format '{}'", s))),
        }
    }
}

/// Tiling and encoding parameters of the pyramid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidConfig {
    /// Nominal tile edge in pixels, excluding overlap.
    pub tile_size: u32,
    /// Pixels shared with each neighbouring tile.
    pub overlap: u32,
    pub format: EncodeFormat,
    /// 0..=1. JPEG quality, or PNG compression effort (PNG stays lossless).
    pub quality: f32,
    pub filter: ResampleFilter,
    /// Levels whose larger side is below this are not written.
    pub min_level_dim: u32,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            overlap: DEFAULT_OVERLAP,
            format: EncodeFormat::Png,
            quality: imaginarium::DEFAULT_QUALITY,
            filter: ResampleFilter::Box,
            min_level_dim: 1,
        }
    }
}

impl PyramidConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(Error::config("tile size must be positive"));
        }
        if self.overlap >= self.tile_size {
            return Err(Error::config(format!(
                "overlap {} must be smaller than tile size {}",
                self.overlap, self.tile_size
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(Error::config(format!(
                "quality must be within 0..=1, got {}",
                self.quality
            )));
        }
        if self.min_level_dim == 0 {
            return Err(Error::config("minimum level dimension must be at least 1"));
        }
        Ok(())
    }
}

/// Everything a run needs: inputs, grid, pyramid parameters, output location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepZoomConfig {
    pub input_dir: PathBuf,
    /// Extension of the source files, matched case-insensitively.
    pub input_extension: String,
    pub output_dir: PathBuf,
    /// Pyramid name: `<name>.dzi` and `<name>_files/`.
    pub name: String,
    pub grid: GridSpec,
    /// Expected source size. When absent the first image decides.
    pub cell_size: Option<CellSize>,
    pub background: Color,
    pub pyramid: PyramidConfig,
    pub descriptor: DescriptorFormat,
    /// Also write the assembled montage as `<name>_montage.png`.
    pub keep_montage: bool,
    /// Upper bound on images decoded at the same time.
    pub max_concurrent_decodes: usize,
}

impl Default for DeepZoomConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            input_extension: "png".to_string(),
            output_dir: PathBuf::from(DEFAULT_NAME),
            name: DEFAULT_NAME.to_string(),
            grid: GridSpec::default(),
            cell_size: None,
            background: Color::WHITE,
            pyramid: PyramidConfig::default(),
            descriptor: DescriptorFormat::Xml,
            keep_montage: false,
            max_concurrent_decodes: 8,
        }
    }
}

impl DeepZoomConfig {
    /// Reads a config file; the format follows its extension (yaml/yml/json).
    pub fn from_file(path: &Path) -> Result<Self> {
        common::read_file(path).map_err(|e| Error::config(format!("{:#}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.contains(['/', '\\']) || self.name == ".." {
            return Err(Error::config(format!(
                "pyramid name must be a plain file name, got '{}'",
                self.name
            )));
        }
        if self.input_extension.trim_start_matches('.').is_empty() {
            return Err(Error::config("input extension must not be empty"));
        }
        if self.max_concurrent_decodes == 0 {
            return Err(Error::config("max concurrent decodes must be at least 1"));
        }

        self.grid.validate()?;
        if let Some(cell) = &self.cell_size {
            cell.validate()?;
        }
        self.pyramid.validate()?;

        if self.pyramid.format == EncodeFormat::Jpeg && !self.background.is_opaque() {
            return Err(Error::config(
                "JPEG tiles cannot carry a transparent background",
            ));
        }

        Ok(())
    }

    pub fn input_extension(&self) -> &str {
        self.input_extension.trim_start_matches('.')
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.descriptor_path_for(self.descriptor)
    }

    /// Descriptor location if it were written as `format`.
    pub fn descriptor_path_for(&self, format: DescriptorFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.name, format.extension()))
    }

    pub fn tiles_dir(&self) -> PathBuf {
        self.output_dir.join(format!("{}_files", self.name))
    }

    pub fn montage_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_montage.png", self.name))
    }
}

/// Converts a signed command-line value into an unsigned parameter.
pub fn checked_u32(name: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::config(format!("{} must be a non-negative integer, got {}", name, value)))
}
