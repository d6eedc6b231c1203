use std::fs;

use common::CancelToken;
use imaginarium::{Color, EncodeFormat, Image};

use super::{list_files, test_config, write_image, write_pages};
use crate::config::{CellSize, DescriptorFormat, GridSpec};
use crate::descriptor::PyramidDescriptor;
use crate::error::Error;
use crate::plan::plan;
use crate::pyramid::tile_path;
use crate::run::{list_inputs, run};

#[test]
fn builds_pyramid_and_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 3, 40, 30);
    let config = test_config(dir.path());

    let summary = run(&config, &CancelToken::new()).unwrap();

    assert_eq!((summary.montage_width, summary.montage_height), (80, 60));
    assert_eq!(summary.sources, 3);
    // max level ceil(log2(80)) = 7
    assert_eq!(summary.levels_written, 8);

    let descriptor = PyramidDescriptor::read(&summary.descriptor_path).unwrap();
    assert_eq!(
        descriptor,
        PyramidDescriptor {
            tile_size: 32,
            overlap: 1,
            format: EncodeFormat::Png,
            width: 80,
            height: 60,
        }
    );

    let tiles = list_files(&config.tiles_dir());
    assert_eq!(tiles.len() as u64, summary.tiles_written);
    assert!(config.tiles_dir().join("0/0_0.png").is_file());
    assert!(config.tiles_dir().join("7/2_1.png").is_file());

    let level0 = Image::read_file(config.tiles_dir().join("0/0_0.png")).unwrap();
    assert_eq!((level0.width(), level0.height()), (1, 1));
}

#[test]
fn empty_cells_show_background() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 1, 40, 30);
    let config = crate::DeepZoomConfig {
        background: Color::BLACK,
        ..test_config(dir.path())
    };

    run(&config, &CancelToken::new()).unwrap();

    // Top-level tile (2, 1) covers only the empty bottom-right cell
    let tile = Image::read_file(tile_path(&config.tiles_dir(), 7, 2, 1, EncodeFormat::Png)).unwrap();
    assert!(tile.bytes().iter().all(|&b| b == 0));
}

#[test]
fn dry_run_plan_matches_files_written() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 4, 50, 20);
    let config = crate::DeepZoomConfig {
        cell_size: Some(CellSize::new(50, 20)),
        ..test_config(dir.path())
    };

    let inputs = list_inputs(&config).unwrap();
    let plan = plan(&config, &inputs).unwrap();
    assert!(!config.output_dir.exists());

    run(&config, &CancelToken::new()).unwrap();

    let written = list_files(&config.tiles_dir());
    assert_eq!(written.len() as u64, plan.tile_count);
    for level in &plan.levels {
        for (col, row) in level.tiles() {
            let path = tile_path(&plan.tiles_dir, level.level, col, row, EncodeFormat::Png);
            assert!(path.is_file(), "missing {}", path.display());
        }
    }
    assert!(plan.descriptor_path.is_file());
}

#[test]
fn rebuild_is_identical_and_removes_stale_tiles() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 4, 40, 30);
    let big = test_config(dir.path());
    run(&big, &CancelToken::new()).unwrap();

    let small = crate::DeepZoomConfig {
        pyramid: crate::PyramidConfig {
            tile_size: 64,
            ..big.pyramid.clone()
        },
        ..big.clone()
    };
    run(&small, &CancelToken::new()).unwrap();
    let first_files = list_files(&small.tiles_dir());
    let first_bytes: Vec<Vec<u8>> = first_files
        .iter()
        .map(|p| fs::read(small.tiles_dir().join(p)).unwrap())
        .collect();

    // Fewer, larger tiles: nothing from the tile size 32 run may survive
    assert!(!small.tiles_dir().join("7/2_1.png").exists());

    run(&small, &CancelToken::new()).unwrap();
    let second_files = list_files(&small.tiles_dir());
    assert_eq!(first_files, second_files);
    for (path, bytes) in second_files.iter().zip(&first_bytes) {
        assert_eq!(&fs::read(small.tiles_dir().join(path)).unwrap(), bytes);
    }
}

#[test]
fn keep_montage_saves_canvas() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 2, 10, 10);
    let config = crate::DeepZoomConfig {
        keep_montage: true,
        ..test_config(dir.path())
    };

    run(&config, &CancelToken::new()).unwrap();

    let montage = Image::read_file(config.montage_path()).unwrap();
    assert_eq!((montage.width(), montage.height()), (20, 20));
}

#[test]
fn json_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 1, 8, 8);
    let config = crate::DeepZoomConfig {
        descriptor: DescriptorFormat::Json,
        grid: GridSpec::new(1, 1),
        ..test_config(dir.path())
    };

    let summary = run(&config, &CancelToken::new()).unwrap();

    assert_eq!(summary.descriptor_path, dir.path().join("out/dzi.json"));
    let descriptor = PyramidDescriptor::read(&summary.descriptor_path).unwrap();
    assert_eq!((descriptor.width, descriptor.height), (8, 8));
}

#[test]
fn cancelled_run_leaves_no_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 2, 40, 30);
    let config = test_config(dir.path());
    run(&config, &CancelToken::new()).unwrap();
    assert!(config.descriptor_path().exists());

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = run(&config, &cancel).unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert!(!config.descriptor_path().exists());
}

#[test]
fn rebuild_removes_descriptor_of_other_format() {
    let dir = tempfile::tempdir().unwrap();
    write_pages(&dir.path().join("pages"), 2, 40, 30);
    let json = crate::DeepZoomConfig {
        descriptor: DescriptorFormat::Json,
        ..test_config(dir.path())
    };
    run(&json, &CancelToken::new()).unwrap();
    let json_path = json.descriptor_path();
    assert!(json_path.is_file());

    let xml = test_config(dir.path());
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = run(&xml, &cancel).unwrap_err();

    assert!(matches!(err, Error::Cancelled { .. }));
    assert!(!json_path.exists());
    assert!(!xml.descriptor_path().exists());

    let summary = run(&xml, &CancelToken::new()).unwrap();
    assert_eq!(summary.descriptor_path, dir.path().join("out/dzi.dzi"));
    assert!(!json_path.exists());
}

#[test]
fn config_errors_come_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let config = crate::DeepZoomConfig {
        input_dir: dir.path().join("missing"),
        pyramid: crate::PyramidConfig {
            tile_size: 0,
            ..Default::default()
        },
        ..test_config(dir.path())
    };

    let err = run(&config, &CancelToken::new()).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(!config.output_dir.exists());
}

#[test]
fn too_many_inputs_fail_before_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    write_pages(&pages, 4, 10, 10);
    // Undecodable, but capacity is checked first
    fs::write(pages.join("page_99.png"), b"not a png").unwrap();
    let config = test_config(dir.path());

    let err = run(&config, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, Error::Capacity { images: 5, cols: 2, rows: 2 }));
}

#[test]
fn corrupt_input_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    write_pages(&pages, 1, 10, 10);
    fs::write(pages.join("page_01.png"), b"not a png").unwrap();

    let err = run(&test_config(dir.path()), &CancelToken::new()).unwrap_err();
    match err {
        Error::Decode { path, .. } => assert_eq!(path, pages.join("page_01.png")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn mismatched_input_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    write_pages(&pages, 2, 40, 30);
    write_image(&pages.join("page_02.png"), 40, 31, Color::RED);

    let err = run(&test_config(dir.path()), &CancelToken::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::InputMismatch {
            width: 40,
            height: 31,
            expected_width: 40,
            expected_height: 30,
            ..
        }
    ));
}

#[test]
fn inputs_sorted_and_filtered_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let pages = dir.path().join("pages");
    write_pages(&pages, 3, 4, 4);
    write_image(&pages.join("cover.PNG"), 4, 4, Color::BLUE);
    fs::write(pages.join("notes.txt"), "skip").unwrap();

    let inputs = list_inputs(&test_config(dir.path())).unwrap();
    let names: Vec<_> = inputs
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["cover.PNG", "page_00.png", "page_01.png", "page_02.png"]);
}

#[test]
fn empty_input_dir_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pages")).unwrap();

    let err = run(&test_config(dir.path()), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
