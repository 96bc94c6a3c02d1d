mod area;
mod config;
mod drawing;
mod errors;
mod flood_fill;
mod image_io;
mod labeling;
mod pipeline;
mod pixels;
mod threshold;
mod union_find;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;

use config::Config;
use image_io::{get_png_files_in_dir, load_image};
use pipeline::process_image;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "LeafSeg - Leaf area and herbivory measurement")]
struct Args {
    /// Path to input image or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Fixed binarization threshold in [0, 1] (overwrites config; default is
    /// automatic via Otsu's method)
    #[clap(short, long)]
    threshold: Option<f32>,

    /// Length of the scale mark in pixels (overwrites config)
    #[clap(short, long)]
    scale_pixels: Option<f64>,

    /// Enable debug mode (print thresholds and component counts)
    #[clap(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration when present; the CLI flags cover the common case.
    let mut config = if Path::new(&args.config).is_file() {
        Config::from_file(&args.config)
            .with_context(|| format!("Loading configuration from {}", args.config))?
    } else {
        Config::default()
    };

    // Override config with command-line arguments.
    if let Some(input) = args.input {
        config.input_path = input;
    }
    if let Some(output) = args.output {
        config.output_base_dir = output;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = Some(threshold);
    }
    if let Some(scale_pixels) = args.scale_pixels {
        config.scale_mark_pixel_length = Some(scale_pixels);
    }

    config.validate()?;

    let start_time = Instant::now();
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        let input_image = load_image(&input_path)?;
        process_image(input_image, &config, args.debug)?;
    } else if input_path.is_dir() {
        println!("Processing directory: {}", input_path.display());
        let png_files = get_png_files_in_dir(&input_path)?;
        println!("Found {} PNG files", png_files.len());

        if config.use_parallel {
            png_files
                .par_iter()
                .for_each(|path| process_file(path, &config, args.debug));
        } else {
            for path in &png_files {
                process_file(path, &config, args.debug);
            }
        }
    } else {
        return Err(errors::LeafSegError::InvalidPath(input_path).into());
    }

    let elapsed = start_time.elapsed();
    println!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}

/// Process one file of a batch, reporting failures without aborting the rest
fn process_file(path: &Path, config: &Config, debug: bool) {
    let result = load_image(path).and_then(|input| process_image(input, config, debug));
    if let Err(error) = result {
        eprintln!("Error processing {}: {}", path.display(), error);
    }
}
