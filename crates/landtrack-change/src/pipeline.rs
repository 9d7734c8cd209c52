//! Year-by-year pipeline: mosaic, track, render, write.

use crate::{
    annotate, frame_path, overlay_text, render_frame, upscale, write_geotiff, write_png,
    ChangeError, ChangeTracker, OutputFormat, OverlayFont, Palette, Result, RunConfig,
};
use landtrack_mosaic::{mosaic_year, GeoKeys, GeoTransform};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One year's subdirectory of the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearDir {
    /// Directory name, used as the year label and the frame file stem.
    pub label: String,
    /// Full path of the directory.
    pub path: PathBuf,
}

/// What was computed and written for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
    /// Year label.
    pub label: String,
    /// Cells in the cumulative gain mask.
    pub gain_cells: usize,
    /// Cells in the cumulative loss mask.
    pub loss_cells: usize,
    /// Cumulative gain area in km².
    pub gain_area_km2: f64,
    /// Cumulative loss area in km².
    pub loss_area_km2: f64,
    /// Frame written for this year.
    pub output: PathBuf,
}

/// List the year subdirectories of the data root, sorted by name.
pub fn list_years<P: AsRef<Path>>(data_dir: P) -> Result<Vec<YearDir>> {
    let mut years = Vec::new();
    for entry in std::fs::read_dir(data_dir.as_ref())? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        match path.file_name().and_then(|s| s.to_str()) {
            Some(label) => years.push(YearDir {
                label: label.to_string(),
                path: path.clone(),
            }),
            None => warn!("Skipping year folder with a non-UTF-8 name: {}", path.display()),
        }
    }
    years.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(years)
}

/// How a year's georeferencing departs from the first year's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drift {
    /// Origin or cell size differs.
    Misaligned,
    /// The CRS keys name a different CRS.
    CrsChanged,
}

/// Georeferencing of the first year, against which later years are checked.
struct Reference {
    transform: GeoTransform,
    geokeys: Option<GeoKeys>,
}

impl Reference {
    fn compare(&self, transform: &GeoTransform, geokeys: Option<&GeoKeys>) -> Vec<Drift> {
        let mut drift = Vec::new();
        if !self.transform.aligned_with(transform) {
            drift.push(Drift::Misaligned);
        }
        if let (Some(first), Some(current)) = (&self.geokeys, geokeys) {
            if !first.same_crs(current) {
                drift.push(Drift::CrsChanged);
            }
        }
        drift
    }

    /// Warn when a year's grid is placed differently or uses another CRS.
    ///
    /// Neither is fatal: cells are still compared by index, and no reprojection is done.
    fn check(&self, year: &str, transform: &GeoTransform, geokeys: Option<&GeoKeys>) {
        for drift in self.compare(transform, geokeys) {
            match drift {
                Drift::Misaligned => warn!(
                    "Year {} grid origin/resolution differs from the first year; comparing cells by index",
                    year
                ),
                Drift::CrsChanged => warn!(
                    "Different CRS detected: year {} uses {}, first year uses {}. Reprojection is not performed.",
                    year,
                    geokeys.map_or_else(|| "no CRS".to_string(), GeoKeys::describe),
                    self.geokeys
                        .as_ref()
                        .map_or_else(|| "no CRS".to_string(), GeoKeys::describe)
                ),
            }
        }
    }
}

/// Run the whole pipeline over every year under `data_dir`.
///
/// Years are processed in name order, one mosaic at a time. The output
/// directory is created if it does not exist. Any error aborts the run;
/// frames already written stay on disk.
pub fn run<P: AsRef<Path>>(data_dir: P, config: &RunConfig) -> Result<Vec<YearSummary>> {
    let data_dir = data_dir.as_ref();
    let years = list_years(data_dir)?;
    if years.is_empty() {
        return Err(ChangeError::NoYears {
            dir: data_dir.to_path_buf(),
        });
    }

    std::fs::create_dir_all(&config.output_dir)?;

    let palette = Palette::from_config(config);
    let font = match config.format {
        OutputFormat::Png => Some(OverlayFont::resolve(
            &config.font_family,
            config.font_file.as_deref(),
        )),
        OutputFormat::GeoTiff => None,
    };
    if let Some(font) = &font {
        info!("Overlay font: {}", font.name());
    }

    let mut tracker = ChangeTracker::new();
    let mut reference: Option<Reference> = None;
    let mut summaries = Vec::with_capacity(years.len());

    for year in &years {
        info!("Mosaicking tiles for year: {}", year.label);
        let mosaic = mosaic_year(&year.path)?;

        if let Some(first) = &reference {
            first.check(&year.label, &mosaic.transform, mosaic.geokeys.as_ref());
        } else {
            reference = Some(Reference {
                transform: mosaic.transform,
                geokeys: mosaic.geokeys.clone(),
            });
        }

        let change = tracker.observe(&year.label, mosaic.grid)?;
        let gain_area_km2 = change.gain_area(config.pixel_area_km2);
        let loss_area_km2 = change.loss_area(config.pixel_area_km2);
        info!(
            "Year: {}, Cumulative Gains: {:.2} km², Cumulative Losses: {:.2} km²",
            year.label, gain_area_km2, loss_area_km2
        );

        let frame = render_frame(change, &palette);
        let output = frame_path(&config.output_dir, &year.label, config.format);
        match config.format {
            OutputFormat::Png => {
                let mut canvas = upscale(&frame, config.canvas_size);
                if let Some(font) = &font {
                    let text = overlay_text(&year.label, gain_area_km2, loss_area_km2);
                    annotate(&mut canvas, font, &palette, config.font_size, &text);
                }
                write_png(&canvas, &output)?;
            }
            OutputFormat::GeoTiff => {
                let geokeys = reference.as_ref().and_then(|r| r.geokeys.as_ref());
                write_geotiff(&frame, &mosaic.transform, geokeys, &output)?;
            }
        }
        info!("Saved {}", output.display());

        summaries.push(YearSummary {
            label: year.label.clone(),
            gain_cells: change.gains().count(),
            loss_cells: change.losses().count(),
            gain_area_km2,
            loss_area_km2,
            output,
        });
    }

    Ok(summaries)
}
