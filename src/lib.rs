// src/lib.rs - Library interface for LeafSeg

pub mod area;
pub mod config;
pub mod drawing;
pub mod errors;
pub mod flood_fill;
pub mod image_io;
pub mod labeling;
pub mod pipeline;
pub mod pixels;
pub mod threshold;
pub mod union_find;

// Re-export commonly used types and functions
pub use errors::{LeafSegError, Result};
pub use config::Config;
pub use pipeline::{process_image, ImageAnalysis};
pub use image_io::{load_image, save_image, InputImage};

// Re-export the segmentation engine
pub use union_find::UnionFind;
pub use pixels::{
    BooleanPixelSource,
    LayeredImage,
    LayeredPixelSource,
    Occupancy,
    Point,
};
pub use labeling::{
    label_connected_components,
    ConnectedComponentsInfo,
    Size,
    BACKGROUND_LABEL,
    DRAWING_LAYER,
};
pub use drawing::{DrawingSink, ImageSink};
pub use flood_fill::flood_fill;
pub use threshold::{luma_histogram, otsu_threshold, NUMBER_OF_HISTOGRAM_BUCKETS};

// Re-export area accounting
pub use area::{
    analyze_consumed_area,
    fill_consumed_regions,
    AreaOptions,
    AreaReport,
    LeafMeasurements,
    Scale,
};
