use image::{Rgba, RgbaImage};

use crate::errors::{LeafSegError, Result};

/// An integer pixel coordinate.
///
/// Also used as a "point to identify": a coordinate whose consolidated label
/// the caller wants reported back from the labeler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Point { x, y }
    }
}

/// What the layered pixel source reports for a single pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Unoccupied,
    /// Occupied, with the index of the first layer that has the pixel set
    Occupied(usize),
}

impl Occupancy {
    pub fn is_occupied(self) -> bool {
        matches!(self, Occupancy::Occupied(_))
    }
}

/// A two-layer (or more) occupancy image consumed by the labeler.
///
/// Layer 0 is the base detected image; layer 1 is the user-overlay correction.
pub trait LayeredPixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn occupancy_and_layer(&self, x: u32, y: u32) -> Occupancy;
}

/// A plain boolean occupancy image, consumed by the flood fill
pub trait BooleanPixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn is_occupied(&self, x: u32, y: u32) -> bool;
}

/// Any layered source is also a boolean source: a pixel is occupied if any
/// layer has it set.
impl<T: LayeredPixelSource> BooleanPixelSource for T {
    fn width(&self) -> u32 {
        LayeredPixelSource::width(self)
    }

    fn height(&self) -> u32 {
        LayeredPixelSource::height(self)
    }

    fn is_occupied(&self, x: u32, y: u32) -> bool {
        self.occupancy_and_layer(x, y).is_occupied()
    }
}

/// Concrete layered image backed by row-major boolean masks.
///
/// "First occupied layer wins": the reported layer for an occupied pixel is
/// the lowest layer index that has the pixel set.
pub struct LayeredImage {
    width: u32,
    height: u32,
    layers: Vec<Vec<bool>>,
}

impl LayeredImage {
    pub fn new(width: u32, height: u32) -> Self {
        LayeredImage {
            width,
            height,
            layers: Vec::new(),
        }
    }

    /// Add a pre-built row-major mask as the next layer
    pub fn add_mask(&mut self, mask: Vec<bool>) -> Result<()> {
        let expected = (self.width * self.height) as usize;
        if mask.len() != expected {
            return Err(LeafSegError::Config(format!(
                "Mask has {} pixels but the image is {}x{}",
                mask.len(),
                self.width,
                self.height
            )));
        }

        self.layers.push(mask);
        Ok(())
    }

    /// Add an RGBA image as the next layer, using the given conversion to
    /// decide which pixels are occupied
    pub fn add_image<F>(&mut self, image: &RgbaImage, pixel_to_bool: F) -> Result<()>
    where
        F: Fn(&Rgba<u8>) -> bool,
    {
        if image.width() != self.width || image.height() != self.height {
            return Err(LeafSegError::Config(format!(
                "Layer is {}x{} but the image is {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            )));
        }

        let mut mask = vec![false; (self.width * self.height) as usize];
        for (x, y, pixel) in image.enumerate_pixels() {
            mask[(y * self.width + x) as usize] = pixel_to_bool(pixel);
        }

        self.layers.push(mask);
        Ok(())
    }
}

impl LayeredPixelSource for LayeredImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn occupancy_and_layer(&self, x: u32, y: u32) -> Occupancy {
        let index = (y * self.width + x) as usize;
        for (layer, mask) in self.layers.iter().enumerate() {
            if mask[index] {
                return Occupancy::Occupied(layer);
            }
        }
        Occupancy::Unoccupied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occupied_layer_wins() {
        let mut image = LayeredImage::new(2, 1);
        image.add_mask(vec![true, false]).unwrap();
        image.add_mask(vec![true, true]).unwrap();

        assert_eq!(image.occupancy_and_layer(0, 0), Occupancy::Occupied(0));
        assert_eq!(image.occupancy_and_layer(1, 0), Occupancy::Occupied(1));
    }

    #[test]
    fn empty_layers_report_unoccupied() {
        let image = LayeredImage::new(3, 3);
        assert_eq!(image.occupancy_and_layer(1, 1), Occupancy::Unoccupied);
        assert!(!image.is_occupied(1, 1));
    }

    #[test]
    fn mask_size_is_validated() {
        let mut image = LayeredImage::new(2, 2);
        assert!(image.add_mask(vec![true; 3]).is_err());
    }

    #[test]
    fn rgba_layer_uses_conversion() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        rgba.put_pixel(1, 0, Rgba([255, 255, 255, 255]));

        let mut image = LayeredImage::new(2, 1);
        image.add_image(&rgba, |pixel| pixel[0] < 128).unwrap();

        assert!(image.is_occupied(0, 0));
        assert!(!image.is_occupied(1, 0));
    }
}
