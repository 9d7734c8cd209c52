//! Example: mosaic one year directory and report presence.
//!
//! Usage: cargo run --example mosaic_year -- <year_dir>

use landtrack_mosaic::{list_tiles, mosaic_year};
use std::env;
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <year_dir>", args[0]);
        eprintln!("Example: {} ./data/2001", args[0]);
        std::process::exit(1);
    }

    let year_dir = &args[1];
    match list_tiles(year_dir) {
        Ok(tiles) => println!("Found {} tiles in {}", tiles.len(), year_dir),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    let start = Instant::now();
    match mosaic_year(year_dir) {
        Ok(mosaic) => {
            let (width, height) = mosaic.grid.dimensions();
            let (min_x, min_y, max_x, max_y) = mosaic.transform.bounds(width, height);
            println!(
                "Mosaic: {}x{} cells in {:.3}s",
                width,
                height,
                start.elapsed().as_secs_f64()
            );
            println!("Extent: x {:.4} to {:.4}, y {:.4} to {:.4}", min_x, max_x, min_y, max_y);
            println!("Present cells: {}", mosaic.grid.count_present());
            if let Some(keys) = &mosaic.geokeys {
                println!("CRS: {}", keys.describe());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
