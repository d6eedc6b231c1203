mod run_tests;

use std::path::{Path, PathBuf};

use imaginarium::{Color, ColorFormat, EncodeFormat, Image, ImageDesc};

use crate::config::{DeepZoomConfig, GridSpec, PyramidConfig};

/// Writes `count` solid-color PNGs named `page_00.png`, `page_01.png`, ...
pub(crate) fn write_pages(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    (0..count)
        .map(|i| {
            let shade = (i * 40 % 256) as u8;
            let color = Color::from_u8(shade, 255 - shade, 128, 255);
            let path = dir.join(format!("page_{i:02}.png"));
            write_image(&path, width, height, color);
            path
        })
        .collect()
}

pub(crate) fn write_image(path: &Path, width: u32, height: u32, color: Color) {
    let desc = ImageDesc::new(width, height, ColorFormat::RGB_U8);
    let image = Image::new_filled(desc, color).unwrap();
    std::fs::write(path, image.encode(EncodeFormat::Png, 0.8).unwrap()).unwrap();
}

pub(crate) fn test_config(root: &Path) -> DeepZoomConfig {
    DeepZoomConfig {
        input_dir: root.join("pages"),
        output_dir: root.join("out"),
        grid: GridSpec::new(2, 2),
        pyramid: PyramidConfig {
            tile_size: 32,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Relative paths of all files below `dir`, sorted.
pub(crate) fn list_files(dir: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }

    let mut files = Vec::new();
    if dir.exists() {
        walk(dir, dir, &mut files);
    }
    files.sort();
    files
}
