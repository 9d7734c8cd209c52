//! # landtrack-change
//!
//! Cumulative land-cover change tracking and frame rendering.
//!
//! Years are visited in sorted order. Each year's tiles are mosaicked into a
//! binary presence grid, compared with the previous year's grid, and folded
//! into two cumulative masks:
//! - **gain**: cells that have ever gone from absent to present
//! - **loss**: cells that have ever gone from present to absent
//!
//! Each year then gets a frame: gain cells in one color, loss cells painted
//! over them in another, everything else transparent. PNG frames are enlarged
//! onto a fixed-size canvas and carry a text overlay with the year and the
//! cumulative areas.
//!
//! ## Example
//!
//! ```no_run
//! use landtrack_change::{run, RunConfig};
//!
//! let config = RunConfig::default();
//! for year in run("data", &config)? {
//!     println!("{}: +{:.2} km² / -{:.2} km²", year.label, year.gain_area_km2, year.loss_area_km2);
//! }
//! # Ok::<(), landtrack_change::ChangeError>(())
//! ```

mod config;
mod error;
mod font;
mod output;
mod pipeline;
mod render;
mod tracker;

pub use config::{
    OutputFormat, RunConfig, DEFAULT_CANVAS_SIZE, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE,
    DEFAULT_OUTPUT_DIR, DEFAULT_PIXEL_AREA_KM2,
};
pub use error::ChangeError;
pub use font::OverlayFont;
pub use output::{frame_path, write_geotiff, write_png};
pub use pipeline::{list_years, run, YearDir, YearSummary};
pub use render::{annotate, overlay_text, render_frame, text_anchor, upscale, Palette};
pub use tracker::{transition, ChangeTracker, CumulativeChange, Mask, Transition};

/// Result type for change tracking operations.
pub type Result<T> = std::result::Result<T, ChangeError>;
