//! landtrack command-line runner.
//!
//! Renders one cumulative change frame per year directory under the data root.

use clap::{Parser, ValueEnum};
use landtrack_change::{run, ChangeError, OutputFormat, RunConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "landtrack", author, version, about = "Render cumulative land-cover change per year")]
struct Cli {
    /// Data root with one subdirectory of GeoTIFF tiles per year (prompted if omitted)
    data_dir: Option<PathBuf>,

    /// Directory frames are written to [default: output_images]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// YAML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame format; overrides the configuration
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Png,
    Geotiff,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Geotiff => OutputFormat::GeoTiff,
        }
    }
}

impl Cli {
    /// Load the configuration file, if any, and apply command-line overrides.
    fn run_config(&self) -> Result<RunConfig, ChangeError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.format = format.into();
        }
        Ok(config)
    }
}

fn setup_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn prompt_data_dir() -> std::io::Result<PathBuf> {
    let answer: String = dialoguer::Input::new()
        .with_prompt("Enter the path to the data directory")
        .interact_text()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(PathBuf::from(answer.trim()))
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = match cli.run_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => match prompt_data_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to read data directory: {}", e);
                std::process::exit(1);
            }
        },
    };

    match run(&data_dir, &config) {
        Ok(summaries) => info!(
            "Rendered {} frames into {}",
            summaries.len(),
            config.output_dir.display()
        ),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
