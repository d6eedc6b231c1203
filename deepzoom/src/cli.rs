// Command-line arguments for the deepzoom binary.

use std::path::PathBuf;

use clap::Parser;
use deepzoom::config::checked_u32;
use deepzoom::{CellSize, DeepZoomConfig, DescriptorFormat, GridSpec};
use imaginarium::{Color, EncodeFormat, ResampleFilter};

/// Lays out equal-sized images on a grid and writes the montage as a Deep Zoom pyramid.
///
/// Flags override values from --config; anything unset keeps its default.
#[derive(Parser, Debug)]
#[command(name = "deepzoom")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the source images
    pub indir: PathBuf,

    /// Output directory [default: dzi]
    #[arg(short = 'o', long = "outdir")]
    pub outdir: Option<PathBuf>,

    /// Pyramid name: <NAME>.dzi and <NAME>_files/ [default: dzi]
    #[arg(short = 'f', long = "outfile", value_name = "NAME")]
    pub outfile: Option<String>,

    /// Grid size in cells [default: 3 3]
    #[arg(short = 'g', long = "griddim", num_args = 2, value_names = ["COLS", "ROWS"])]
    pub griddim: Option<Vec<u32>>,

    /// Size every source must have [default: size of the first image]
    #[arg(short = 'm', long = "imdim", num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub imdim: Option<Vec<u32>>,

    /// Extension of the source files [default: png]
    #[arg(short = 'x', long = "imext", value_name = "EXT")]
    pub imext: Option<String>,

    /// Tile size in pixels [default: 254]
    #[arg(short = 't', long = "tilesz", allow_negative_numbers = true)]
    pub tilesz: Option<i64>,

    /// Tile overlap in pixels [default: 1]
    #[arg(long, allow_negative_numbers = true)]
    pub overlap: Option<i64>,

    /// Tile format: png or jpg [default: png]
    #[arg(long)]
    pub format: Option<EncodeFormat>,

    /// Encoding quality in 0..=1 [default: 0.8]
    #[arg(short = 'q', long = "imquality")]
    pub imquality: Option<f32>,

    /// Downsampling filter: box, lanczos3 or nearest [default: box]
    #[arg(long)]
    pub filter: Option<ResampleFilter>,

    /// Color of empty cells: a name or #rrggbb[aa] [default: white]
    #[arg(long)]
    pub background: Option<Color>,

    /// Descriptor encoding: xml or json [default: xml]
    #[arg(long)]
    pub descriptor: Option<DescriptorFormat>,

    /// Skip levels whose larger side is below this many pixels [default: 1]
    #[arg(long)]
    pub min_level_dim: Option<u32>,

    /// Also save the full montage as <NAME>_montage.png
    #[arg(long)]
    pub keep_montage: bool,

    /// YAML or JSON file with a full or partial configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print what would be written and exit
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Worker threads [default: number of CPUs]
    #[arg(long)]
    pub threads: Option<usize>,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Merges the optional config file with the flags given.
    pub fn to_config(&self) -> deepzoom::Result<DeepZoomConfig> {
        let mut config = match &self.config {
            Some(path) => DeepZoomConfig::from_file(path)?,
            None => DeepZoomConfig::default(),
        };

        config.input_dir = self.indir.clone();
        if let Some(dir) = &self.outdir {
            config.output_dir = dir.clone();
        }
        if let Some(name) = &self.outfile {
            config.name = name.clone();
        }
        if let Some([cols, rows]) = self.griddim.as_deref() {
            config.grid = GridSpec::new(*cols, *rows);
        }
        if let Some([width, height]) = self.imdim.as_deref() {
            config.cell_size = Some(CellSize::new(*width, *height));
        }
        if let Some(ext) = &self.imext {
            config.input_extension = ext.clone();
        }
        if let Some(tile_size) = self.tilesz {
            config.pyramid.tile_size = checked_u32("tile size", tile_size)?;
        }
        if let Some(overlap) = self.overlap {
            config.pyramid.overlap = checked_u32("overlap", overlap)?;
        }
        if let Some(format) = self.format {
            config.pyramid.format = format;
        }
        if let Some(quality) = self.imquality {
            config.pyramid.quality = quality;
        }
        if let Some(filter) = self.filter {
            config.pyramid.filter = filter;
        }
        if let Some(background) = self.background {
            config.background = background;
        }
        if let Some(descriptor) = self.descriptor {
            config.descriptor = descriptor;
        }
        if let Some(min_level_dim) = self.min_level_dim {
            config.pyramid.min_level_dim = min_level_dim;
        }
        if self.keep_montage {
            config.keep_montage = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["deepzoom", "pages"]);
        let config = cli.to_config().unwrap();

        assert_eq!(config, DeepZoomConfig {
            input_dir: PathBuf::from("pages"),
            ..Default::default()
        });
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_grid_and_dimensions() {
        let cli = Cli::parse_from(["deepzoom", "pages", "-g", "4", "2", "-m", "640", "480"]);
        let config = cli.to_config().unwrap();

        assert_eq!(config.grid, GridSpec::new(4, 2));
        assert_eq!(config.cell_size, Some(CellSize::new(640, 480)));
    }

    #[test]
    fn test_cli_output_options() {
        let cli = Cli::parse_from([
            "deepzoom",
            "pages",
            "-o",
            "site",
            "-f",
            "poster",
            "--format",
            "jpg",
            "-q",
            "0.9",
            "--filter",
            "lanczos3",
            "--background",
            "#0a0a0a",
            "--descriptor",
            "json",
            "--keep-montage",
        ]);
        let config = cli.to_config().unwrap();

        assert_eq!(config.descriptor_path(), PathBuf::from("site/poster.json"));
        assert_eq!(config.pyramid.format, EncodeFormat::Jpeg);
        assert_eq!(config.pyramid.quality, 0.9);
        assert_eq!(config.pyramid.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.background, Color::from_u8(10, 10, 10, 255));
        assert!(config.keep_montage);
    }

    #[test]
    fn test_cli_negative_overlap_is_config_error() {
        let cli = Cli::parse_from(["deepzoom", "pages", "--overlap", "-1"]);
        assert_eq!(cli.overlap, Some(-1));
        assert!(matches!(cli.to_config(), Err(deepzoom::Error::Config(_))));

        let cli = Cli::parse_from(["deepzoom", "pages", "-t", "-254"]);
        assert!(matches!(cli.to_config(), Err(deepzoom::Error::Config(_))));
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["deepzoom", "pages", "--format", "gif"]).is_err());
        assert!(Cli::try_parse_from(["deepzoom", "pages", "--background", "teal"]).is_err());
        assert!(Cli::try_parse_from(["deepzoom", "pages", "-g", "3"]).is_err());
        assert!(Cli::try_parse_from(["deepzoom"]).is_err());
    }

    #[test]
    fn test_cli_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.yaml");
        std::fs::write(&path, "name: poster\npyramid:\n  tile_size: 510\n  overlap: 2\n").unwrap();

        let cli = Cli::parse_from([
            "deepzoom",
            "pages",
            "--config",
            path.to_str().unwrap(),
            "--overlap",
            "0",
        ]);
        let config = cli.to_config().unwrap();

        assert_eq!(config.name, "poster");
        assert_eq!(config.pyramid.tile_size, 510);
        assert_eq!(config.pyramid.overlap, 0);
    }
}
