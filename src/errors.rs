use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for LeafSeg
#[derive(Error, Debug)]
pub enum LeafSegError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Label {0} was never registered in the disjoint-set registry")]
    UnknownLabel(i32),

    #[error("Label {0} is already registered in the disjoint-set registry")]
    DuplicateLabel(i32),

    #[error("Cannot convert to physical units without a scale")]
    MissingScale,

    #[error("Point ({x}, {y}) is outside the {width}x{height} image")]
    PointOutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, LeafSegError>;
