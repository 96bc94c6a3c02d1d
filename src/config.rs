use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{LeafSegError, Result};

/// Configuration for LeafSeg
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// Fixed binarization threshold in [0, 1]; when unset, Otsu's method
    /// picks one per image
    #[serde(default)]
    pub threshold: Option<f32>,

    /// Length of the scale mark in pixels; physical-area output needs this
    #[serde(default)]
    pub scale_mark_pixel_length: Option<f64>,

    /// Physical length of the scale mark, in centimeters
    #[serde(default = "default_scale_physical_length")]
    pub scale_physical_length: f64,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Save a PNG highlighting the consumed regions next to the results
    #[serde(default = "default_save_hole_overlay")]
    pub save_hole_overlay: bool,

    #[serde(default = "default_hole_overlay_color")]
    pub hole_overlay_color_rgb: [u8; 3],
}

fn default_scale_physical_length() -> f64 {
    // The standard scale mark is a 2 cm square corner.
    2.0
}

fn default_parallel() -> bool {
    true
}

fn default_save_hole_overlay() -> bool {
    true
}

fn default_hole_overlay_color() -> [u8; 3] {
    [255, 0, 0]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_path: String::new(),
            output_base_dir: "output".to_string(),
            threshold: None,
            scale_mark_pixel_length: None,
            scale_physical_length: default_scale_physical_length(),
            use_parallel: default_parallel(),
            save_hole_overlay: default_save_hole_overlay(),
            hole_overlay_color_rgb: default_hole_overlay_color(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        toml::from_str(&contents).map_err(|source| LeafSegError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.input_path.is_empty() {
            return Err(LeafSegError::Config("No input path specified".to_string()));
        }

        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(LeafSegError::Config(format!(
                    "Threshold must be within [0, 1], got {}",
                    threshold
                )));
            }
        }

        if let Some(length) = self.scale_mark_pixel_length {
            if length <= 0.0 {
                return Err(LeafSegError::Config(format!(
                    "Scale mark pixel length must be positive, got {}",
                    length
                )));
            }
        }

        if self.scale_physical_length <= 0.0 {
            return Err(LeafSegError::Config(format!(
                "Scale physical length must be positive, got {}",
                self.scale_physical_length
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "leaves/"
            output_base_dir = "out/"
            "#,
        )
        .unwrap();

        assert_eq!(config.threshold, None);
        assert_eq!(config.scale_physical_length, 2.0);
        assert!(config.use_parallel);
        assert!(config.save_hole_overlay);
        config.validate().unwrap();
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = Config {
            input_path: "leaf.png".to_string(),
            threshold: Some(1.5),
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(LeafSegError::Config(_))));
    }

    #[test]
    fn nonpositive_scale_is_rejected() {
        let config = Config {
            input_path: "leaf.png".to_string(),
            scale_mark_pixel_length: Some(0.0),
            ..Config::default()
        };

        assert!(matches!(config.validate(), Err(LeafSegError::Config(_))));
    }
}
