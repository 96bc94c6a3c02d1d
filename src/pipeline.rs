use std::fs;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use crate::area::{analyze_consumed_area, fill_consumed_regions, AreaOptions, AreaReport, Scale};
use crate::config::Config;
use crate::drawing::ImageSink;
use crate::errors::Result;
use crate::image_io::{save_image, InputImage};
use crate::labeling::label_connected_components;
use crate::pixels::LayeredImage;
use crate::threshold::{luma_histogram, otsu_threshold};

/// Results of processing one photo
pub struct ImageAnalysis {
    pub filename: String,
    /// The normalized binarization threshold that was applied
    pub threshold: f32,
    pub report: AreaReport,
}

/// Run the full measurement pipeline on one photo: pick a threshold,
/// binarize, label connected components, and account consumed area.
pub fn process_image(input: InputImage, config: &Config, debug: bool) -> Result<ImageAnalysis> {
    let histogram = luma_histogram(&input.image);
    let threshold = config.threshold.unwrap_or_else(|| otsu_threshold(&histogram));

    // The leaf is photographed dark on a light background, so pixels at or
    // below the threshold are the occupied ones.
    let cutoff = (threshold * 255.0).round() as u32;
    let mut layered = LayeredImage::new(input.image.width(), input.image.height());
    layered.add_image(&input.image, |pixel| {
        let luma = (299 * pixel[0] as u32 + 587 * pixel[1] as u32 + 114 * pixel[2] as u32) / 1000;
        luma <= cutoff
    })?;

    let info = label_connected_components(&layered, &[])?;

    let scale = config.scale_mark_pixel_length.map(|pixel_length| Scale {
        scale_mark_pixel_length: pixel_length,
        physical_length: config.scale_physical_length,
    });
    let options = AreaOptions {
        scale,
        ..AreaOptions::default()
    };
    let report = analyze_consumed_area(&info, &options)?;

    if debug {
        println!(
            "{}: threshold {:.4} ({} components)",
            input.filename,
            threshold,
            info.label_to_size.len()
        );
    }

    match &report {
        AreaReport::Leaf(measurements) => {
            if !measurements.hole_labels.is_empty() && config.save_hole_overlay {
                let mut overlay = RgbaImage::new(input.image.width(), input.image.height());
                let [r, g, b] = config.hole_overlay_color_rgb;
                let mut sink = ImageSink::new(&mut overlay, Rgba([r, g, b, 255]));
                fill_consumed_regions(measurements, &info, &layered, &mut sink)?;

                let output_path = overlay_path(config, &input.filename);
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                save_image(&overlay, &output_path)?;
            }

            match scale {
                Some(_) => println!(
                    "{}: leaf is {:.3} cm2 with {:.3} cm2 ({:.3}%) eaten",
                    input.filename,
                    measurements.physical_leaf_area()?,
                    measurements.physical_consumed_area()?,
                    measurements.percent_consumed
                ),
                None => println!(
                    "{}: leaf is {:.3}% eaten ({} of {} pixels)",
                    input.filename,
                    measurements.percent_consumed,
                    measurements.consumed_pixels,
                    measurements.leaf_area_pixels
                ),
            }
        }
        AreaReport::NoLeafFound => {
            println!("{}: no leaf found", input.filename);
        }
    }

    Ok(ImageAnalysis {
        filename: input.filename,
        threshold,
        report,
    })
}

fn overlay_path(config: &Config, filename: &str) -> PathBuf {
    PathBuf::from(&config.output_base_dir).join(format!("{}_holes.png", filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::LeafMeasurements;
    use assert_approx_eq::assert_approx_eq;

    /// A white background with a dark leaf square that has a light hole
    fn synthetic_leaf_photo() -> InputImage {
        let mut image = RgbaImage::from_pixel(9, 9, Rgba([255, 255, 255, 255]));
        for y in 2..7 {
            for x in 2..7 {
                image.put_pixel(x, y, Rgba([20, 60, 20, 255]));
            }
        }
        // A 1-pixel hole in the middle of the leaf.
        image.put_pixel(4, 4, Rgba([255, 255, 255, 255]));

        InputImage {
            image,
            filename: "synthetic".to_string(),
        }
    }

    fn test_config() -> Config {
        Config {
            input_path: "unused".to_string(),
            save_hole_overlay: false,
            ..Config::default()
        }
    }

    fn expect_leaf(report: &AreaReport) -> &LeafMeasurements {
        match report {
            AreaReport::Leaf(measurements) => measurements,
            AreaReport::NoLeafFound => panic!("expected a leaf"),
        }
    }

    #[test]
    fn measures_synthetic_leaf_end_to_end() {
        let analysis = process_image(synthetic_leaf_photo(), &test_config(), false).unwrap();

        let measurements = expect_leaf(&analysis.report);
        assert_eq!(measurements.consumed_pixels, 1);
        assert_eq!(measurements.leaf_area_pixels, 25);
        assert_approx_eq!(measurements.percent_consumed, 4.0, 1e-9);
    }

    #[test]
    fn fixed_threshold_overrides_otsu() {
        let config = Config {
            threshold: Some(0.0),
            ..test_config()
        };
        let analysis = process_image(synthetic_leaf_photo(), &config, false).unwrap();

        // With the threshold forced to zero nothing is dark enough to be a
        // leaf (only luma 0 would qualify).
        assert_approx_eq!(analysis.threshold, 0.0, 1e-9);
        assert_eq!(analysis.report, AreaReport::NoLeafFound);
    }

    #[test]
    fn scale_carries_through_to_physical_areas() {
        let config = Config {
            scale_mark_pixel_length: Some(10.0),
            ..test_config()
        };
        let analysis = process_image(synthetic_leaf_photo(), &config, false).unwrap();

        let measurements = expect_leaf(&analysis.report);
        // (2 cm / 10 px)^2 * 25 px = 1 cm2.
        assert_approx_eq!(measurements.physical_leaf_area().unwrap(), 1.0, 1e-9);
    }
}
