//! Single raster tile representation.

use crate::{GeoTransform, MosaicError, Result};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

/// GeoKey holding the EPSG code of a projected CRS.
const PROJECTED_CS_TYPE_KEY: u16 = 3072;
/// GeoKey holding the EPSG code of a geographic CRS.
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
/// GeoKey value meaning "user-defined", i.e. not an EPSG code.
const USER_DEFINED: u16 = 32767;

/// A single tile loaded from a GeoTIFF file.
///
/// Only the first band is kept.
#[derive(Debug, Clone)]
pub struct Tile {
    /// First-band samples in row-major order (north to south, west to east).
    data: Vec<f64>,
    /// Width of the tile in pixels.
    width: u32,
    /// Height of the tile in pixels.
    height: u32,
    /// Pixel-to-map transform.
    transform: GeoTransform,
    /// No-data value (samples equal to this are treated as missing).
    no_data_value: Option<f64>,
    /// Raw GeoKey tags describing the coordinate reference system.
    geokeys: Option<GeoKeys>,
}

/// Coordinate reference system description copied verbatim from GeoTIFF tags.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKeys {
    /// GeoKeyDirectory: a 4-short header followed by 4-short key entries.
    pub directory: Vec<u16>,
    /// GeoDoubleParams referenced by the directory.
    pub double_params: Vec<f64>,
    /// GeoAsciiParams referenced by the directory.
    pub ascii_params: Option<String>,
}

impl GeoKeys {
    /// EPSG code of the CRS, preferring the projected CRS over the geographic one.
    pub fn epsg(&self) -> Option<u16> {
        let lookup = |key: u16| {
            self.directory
                .get(4..)?
                .chunks_exact(4)
                .find(|entry| entry[0] == key && entry[1] == 0)
                .map(|entry| entry[3])
                .filter(|&code| code != 0 && code != USER_DEFINED)
        };
        lookup(PROJECTED_CS_TYPE_KEY).or_else(|| lookup(GEOGRAPHIC_TYPE_KEY))
    }

    /// Whether two key sets describe the same CRS.
    ///
    /// Compares EPSG codes when both have one, otherwise the raw tags.
    pub fn same_crs(&self, other: &GeoKeys) -> bool {
        match (self.epsg(), other.epsg()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Short human-readable label for log messages.
    pub fn describe(&self) -> String {
        match self.epsg() {
            Some(code) => format!("EPSG:{}", code),
            None => "user-defined CRS".to_string(),
        }
    }
}

impl Tile {
    /// Load a tile from a GeoTIFF file.
    ///
    /// The file handle is released before this returns.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::io::BufReader::new(std::fs::File::open(path)?);
        let mut decoder = Decoder::new(file)?;

        // Land-cover tiles can be large single-strip rasters
        let mut limits = Limits::default();
        limits.decoding_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.intermediate_buffer_size = 1024 * 1024 * 1024; // 1 GB
        limits.ifd_value_size = 1024 * 1024 * 1024;
        decoder = decoder.with_limits(limits);

        let (width, height) = decoder.dimensions()?;
        if width == 0 || height == 0 {
            return Err(MosaicError::EmptyTile(path.display().to_string()));
        }

        let transform = Self::read_geotransform(&mut decoder, path)?;
        let geokeys = Self::read_geokeys(&mut decoder);
        let no_data_value = Self::read_nodata_value(&mut decoder);
        let data = Self::decode_first_band(&mut decoder, width, height, path)?;

        Ok(Self {
            data,
            width,
            height,
            transform,
            no_data_value,
            geokeys,
        })
    }

    /// Build a tile from in-memory samples.
    pub fn from_parts(
        data: Vec<f64>,
        width: u32,
        height: u32,
        transform: GeoTransform,
        no_data_value: Option<f64>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MosaicError::EmptyTile(format!("{}x{}", width, height)));
        }
        if data.len() != width as usize * height as usize {
            return Err(MosaicError::InvalidDimensions {
                width: width as usize,
                height: height as usize,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            transform,
            no_data_value,
            geokeys: None,
        })
    }

    /// Read the geotransform from GeoTIFF tags.
    ///
    /// Tries ModelTiepoint + ModelPixelScale first, then ModelTransformation.
    fn read_geotransform<R: std::io::Read + std::io::Seek>(
        decoder: &mut Decoder<R>,
        path: &Path,
    ) -> Result<GeoTransform> {
        let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag);
        let pixel_scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag);

        if let (Ok(tiepoint), Ok(scale)) = (tiepoint, pixel_scale) {
            if let Some(transform) = GeoTransform::from_tiepoint(&tiepoint, &scale) {
                return Ok(transform);
            }
        }

        if let Ok(matrix) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
            if let Some(transform) = GeoTransform::from_model_transformation(&matrix) {
                return Ok(transform);
            }
        }

        Err(MosaicError::InvalidGeoTiff(format!(
            "{} has no georeferencing tags",
            path.display()
        )))
    }

    /// Read the GeoKey tags, if present.
    fn read_geokeys<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<GeoKeys> {
        let directory = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
        let double_params = decoder
            .get_tag_f64_vec(Tag::GeoDoubleParamsTag)
            .unwrap_or_default();
        let ascii_params = decoder.get_tag_ascii_string(Tag::GeoAsciiParamsTag).ok();
        Some(GeoKeys {
            directory,
            double_params,
            ascii_params,
        })
    }

    /// Try to read the no-data value from the GDAL_NODATA ASCII tag.
    fn read_nodata_value<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
        decoder
            .get_tag_ascii_string(Tag::GdalNodata)
            .ok()
            .and_then(|s| s.trim().trim_end_matches('\0').parse().ok())
    }

    /// Decode the image and keep only the first sample of each pixel.
    fn decode_first_band<R: std::io::Read + std::io::Seek>(
        decoder: &mut Decoder<R>,
        width: u32,
        height: u32,
        path: &Path,
    ) -> Result<Vec<f64>> {
        let samples: Vec<f64> = match decoder.read_image()? {
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
        };

        let pixels = width as usize * height as usize;
        if samples.len() < pixels || samples.len() % pixels != 0 {
            return Err(MosaicError::InvalidGeoTiff(format!(
                "{} decoded {} samples for {}x{} pixels",
                path.display(),
                samples.len(),
                width,
                height
            )));
        }

        let bands = samples.len() / pixels;
        if bands == 1 {
            return Ok(samples);
        }
        Ok(samples.into_iter().step_by(bands).collect())
    }

    /// Whether a sample holds real data (not no-data, not NaN).
    pub fn is_valid(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.no_data_value {
            Some(nodata) => value != nodata,
            None => true,
        }
    }

    /// Sample at column `x`, row `y`.
    pub fn value(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get((y as usize) * (self.width as usize) + x as usize).copied()
    }

    /// First-band samples in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get the dimensions of this tile in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel-to-map transform.
    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    /// No-data value, if the file declares one.
    pub fn no_data_value(&self) -> Option<f64> {
        self.no_data_value
    }

    /// CRS tags, if the file carries them.
    pub fn geokeys(&self) -> Option<&GeoKeys> {
        self.geokeys.as_ref()
    }

    /// Map bounds `(min_x, min_y, max_x, max_y)` of the tile.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.width as usize, self.height as usize)
    }
}
