//! End-to-end tests: GeoTIFF year directories in, frames out.

use approx::assert_relative_eq;
use landtrack_change::{run, ChangeError, OutputFormat, RunConfig};
use landtrack_mosaic::MosaicError;
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Placement and CRS of a fixture tile.
struct Georef {
    origin: (f64, f64),
    epsg_key: u16,
    epsg: u16,
}

const WGS84_AT_100_20: Georef = Georef {
    origin: (100.0, 20.0),
    epsg_key: 2048,
    epsg: 4326,
};

/// Write one year directory holding a single 8-bit tile anchored at (100, 20).
fn write_year(root: &Path, year: &str, width: u32, height: u32, cells: &[u8]) {
    write_year_with(root, year, width, height, cells, &WGS84_AT_100_20);
}

fn write_year_with(root: &Path, year: &str, width: u32, height: u32, cells: &[u8], georef: &Georef) {
    let dir = root.join(year);
    std::fs::create_dir_all(&dir).unwrap();
    let file = File::create(dir.join("tile_0.tif")).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder
        .new_image::<colortype::Gray8>(width, height)
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[0.01f64, 0.01, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(
            Tag::ModelTiepointTag,
            &[0.0f64, 0.0, 0.0, georef.origin.0, georef.origin.1, 0.0][..],
        )
        .unwrap();
    image
        .encoder()
        .write_tag(
            Tag::GeoKeyDirectoryTag,
            &[1u16, 1, 0, 1, georef.epsg_key, 0, 1, georef.epsg][..],
        )
        .unwrap();
    image.write_data(cells).unwrap();
}

fn config(out: &Path, format: OutputFormat) -> RunConfig {
    RunConfig {
        output_dir: out.to_path_buf(),
        format,
        pixel_area_km2: 0.5,
        canvas_size: 300,
        font_size: 12.0,
        ..RunConfig::default()
    }
}

fn read_rgba(path: &Path) -> Vec<u8> {
    let mut decoder = Decoder::new(File::open(path).unwrap()).unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::U8(data) => data,
        other => panic!("unexpected sample type {:?}", std::mem::discriminant(&other)),
    }
}

#[test]
fn test_three_year_scenario_geotiff() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 2, 2, &[0, 0, 0, 0]);
    write_year(root.path(), "2001", 2, 2, &[1, 0, 0, 0]);
    write_year(root.path(), "2002", 2, 2, &[1, 0, 1, 1]);
    let out = root.path().join("frames");

    let summaries = run(root.path(), &config(&out, OutputFormat::GeoTiff)).unwrap();

    let counts: Vec<_> = summaries
        .iter()
        .map(|s| (s.label.as_str(), s.gain_cells, s.loss_cells))
        .collect();
    assert_eq!(counts, vec![("2000", 0, 0), ("2001", 1, 0), ("2002", 3, 0)]);
    assert_relative_eq!(summaries[0].gain_area_km2, 0.0);
    assert_relative_eq!(summaries[2].gain_area_km2, 1.5);
    assert_relative_eq!(summaries[2].loss_area_km2, 0.0);

    let yellow = [255u8, 255, 0, 255];
    let clear = [0u8, 0, 0, 0];
    let first = read_rgba(&out.join("2000.tif"));
    assert!(first.chunks(4).all(|px| px == clear));

    let last = read_rgba(&out.join("2002.tif"));
    let pixels: Vec<&[u8]> = last.chunks(4).collect();
    assert_eq!(pixels, vec![&yellow[..], &clear[..], &yellow[..], &yellow[..]]);
}

#[test]
fn test_geotiff_frames_are_georeferenced() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 2, 1, &[0, 1]);
    let out = root.path().join("frames");
    run(root.path(), &config(&out, OutputFormat::GeoTiff)).unwrap();

    let mut decoder = Decoder::new(File::open(out.join("2000.tif")).unwrap()).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (2, 1));
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).unwrap();
    assert_relative_eq!(tiepoint[3], 100.0);
    assert_relative_eq!(tiepoint[4], 20.0);
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).unwrap();
    assert_eq!(keys, vec![1, 1, 0, 1, 2048, 0, 1, 4326]);
}

#[test]
fn test_loss_color_wins_after_gain_then_loss() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 1, 1, &[0]);
    write_year(root.path(), "2001", 1, 1, &[1]);
    write_year(root.path(), "2002", 1, 1, &[0]);
    write_year(root.path(), "2003", 1, 1, &[0]);
    let out = root.path().join("frames");

    let summaries = run(root.path(), &config(&out, OutputFormat::GeoTiff)).unwrap();
    assert_eq!((summaries[3].gain_cells, summaries[3].loss_cells), (1, 1));

    assert_eq!(read_rgba(&out.join("2001.tif")), vec![255, 255, 0, 255]);
    assert_eq!(read_rgba(&out.join("2002.tif")), vec![255, 0, 0, 255]);
    assert_eq!(read_rgba(&out.join("2003.tif")), vec![255, 0, 0, 255]);
}

fn read_png(path: &Path) -> image::RgbaImage {
    image::open(path).unwrap().to_rgba8()
}

#[test]
fn test_png_frames_written_per_year() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 3, 3, &[0; 9]);
    write_year(root.path(), "2001", 3, 3, &[1; 9]);
    let out = root.path().join("nested").join("frames");

    let summaries = run(root.path(), &config(&out, OutputFormat::Png)).unwrap();
    assert_eq!(summaries.len(), 2);
    for (summary, year) in summaries.iter().zip(["2000", "2001"]) {
        assert_eq!(summary.output, out.join(format!("{}.png", year)));
        // 3 cells of 100 px each on the 300 px canvas
        assert_eq!(read_png(&summary.output).dimensions(), (300, 300));
    }
}

#[test]
fn test_png_cells_survive_annotation() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 2, 2, &[0, 1, 0, 0]);
    write_year(root.path(), "2001", 2, 2, &[1, 0, 0, 0]);
    let out = root.path().join("frames");

    run(root.path(), &config(&out, OutputFormat::Png)).unwrap();

    let yellow = image::Rgba([255u8, 255, 0, 255]);
    let red = image::Rgba([255u8, 0, 0, 255]);
    let clear = image::Rgba([0u8, 0, 0, 0]);
    let frame = read_png(&out.join("2001.png"));
    assert_eq!(frame.dimensions(), (300, 300));

    // Each cell is a 150 px block; the text occupies the top rows only
    assert_eq!(*frame.get_pixel(75, 75), yellow);
    assert_eq!(*frame.get_pixel(225, 75), red);
    assert_eq!(*frame.get_pixel(149, 149), yellow);
    assert_eq!(*frame.get_pixel(150, 149), red);
    assert!(frame
        .enumerate_pixels()
        .filter(|(_, y, _)| *y >= 150)
        .all(|(_, _, p)| *p == clear));

    // The annotation changed pixels inside the top band of both cells
    let annotated = frame
        .enumerate_pixels()
        .filter(|(_, y, _)| *y < 70)
        .filter(|(x, _, p)| **p != if *x < 150 { yellow } else { red })
        .count();
    assert!(annotated > 0);
}

#[test]
fn test_png_loss_color_wins_on_single_cell() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 1, 1, &[0]);
    write_year(root.path(), "2001", 1, 1, &[1]);
    write_year(root.path(), "2002", 1, 1, &[0]);
    let out = root.path().join("frames");

    run(root.path(), &config(&out, OutputFormat::Png)).unwrap();

    let gained = read_png(&out.join("2001.png"));
    assert_eq!(*gained.get_pixel(150, 150), image::Rgba([255, 255, 0, 255]));
    let lost = read_png(&out.join("2002.png"));
    assert_eq!(*lost.get_pixel(150, 150), image::Rgba([255, 0, 0, 255]));
    assert_eq!(*lost.get_pixel(299, 299), image::Rgba([255, 0, 0, 255]));
}

#[test]
fn test_crs_and_origin_drift_do_not_stop_run() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 2, 1, &[0, 0]);
    write_year_with(
        root.path(),
        "2001",
        2,
        1,
        &[1, 0],
        &Georef {
            origin: (500000.0, 3300000.0),
            epsg_key: 3072,
            epsg: 32643,
        },
    );
    let out = root.path().join("frames");

    let summaries = run(root.path(), &config(&out, OutputFormat::GeoTiff)).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1].gain_cells, 1);

    let mut decoder = Decoder::new(File::open(out.join("2001.tif")).unwrap()).unwrap();
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).unwrap();
    assert_eq!(keys, vec![1, 1, 0, 1, 2048, 0, 1, 4326]);
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).unwrap();
    assert_relative_eq!(tiepoint[3], 500000.0);
}

#[test]
fn test_year_without_tiles_aborts_run() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 1, 1, &[1]);
    std::fs::create_dir(root.path().join("2001")).unwrap();
    let out = root.path().join("frames");

    let err = run(root.path(), &config(&out, OutputFormat::GeoTiff)).unwrap_err();
    assert!(matches!(err, ChangeError::Mosaic(MosaicError::NoTiles { .. })));
    // The first year's frame was already flushed
    assert!(out.join("2000.tif").exists());
}

#[test]
fn test_shape_mismatch_aborts_run() {
    let root = tempfile::tempdir().unwrap();
    write_year(root.path(), "2000", 2, 2, &[0; 4]);
    write_year(root.path(), "2001", 3, 2, &[0; 6]);
    let out = root.path().join("frames");

    match run(root.path(), &config(&out, OutputFormat::GeoTiff)) {
        Err(ChangeError::ShapeMismatch {
            year,
            expected_width,
            found_width,
            ..
        }) => {
            assert_eq!(year, "2001");
            assert_eq!((expected_width, found_width), (2, 3));
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
}
