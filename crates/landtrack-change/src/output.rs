//! Writing rendered frames to disk.

use crate::{OutputFormat, Result};
use image::{ImageFormat, RgbaImage};
use landtrack_mosaic::{GeoKeys, GeoTransform};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tiff::encoder::compression::Lzw;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Path of the frame for `year` in `dir`.
pub fn frame_path(dir: &Path, year: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", year, format.extension()))
}

/// Save a frame as an RGBA PNG.
pub fn write_png(frame: &RgbaImage, path: &Path) -> Result<()> {
    frame.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a frame as an LZW-compressed RGBA GeoTIFF georeferenced by `transform`.
///
/// The CRS keys, when given, are copied through unchanged.
pub fn write_geotiff(
    frame: &RgbaImage,
    transform: &GeoTransform,
    geokeys: Option<&GeoKeys>,
    path: &Path,
) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image_with_compression::<colortype::RGBA8, _>(
        frame.width(),
        frame.height(),
        Lzw::default(),
    )?;

    let scale = [transform.pixel_width, transform.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;

    if let Some(keys) = geokeys {
        image
            .encoder()
            .write_tag(Tag::GeoKeyDirectoryTag, keys.directory.as_slice())?;
        if !keys.double_params.is_empty() {
            image
                .encoder()
                .write_tag(Tag::GeoDoubleParamsTag, keys.double_params.as_slice())?;
        }
        if let Some(ascii) = &keys.ascii_params {
            image
                .encoder()
                .write_tag(Tag::GeoAsciiParamsTag, ascii.as_str())?;
        }
    }

    image.write_data(frame.as_raw())?;
    Ok(())
}
