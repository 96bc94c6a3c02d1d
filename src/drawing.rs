use bresenham::Bresenham;
use image::{Rgba, RgbaImage};

use crate::pixels::Point;

/// Sink for the side-effecting drawing calls the engine issues.
///
/// Drawing a point to itself must render at least that single pixel; the
/// flood fill relies on this for single-pixel regions.
pub trait DrawingSink {
    fn draw_line(&mut self, from: Point, to: Point);
}

/// A drawing sink that rasterizes lines into an RGBA image with a fixed color
pub struct ImageSink<'a> {
    image: &'a mut RgbaImage,
    color: Rgba<u8>,
}

impl<'a> ImageSink<'a> {
    pub fn new(image: &'a mut RgbaImage, color: Rgba<u8>) -> Self {
        ImageSink { image, color }
    }

    fn put(&mut self, x: isize, y: isize) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, self.color);
        }
    }
}

impl DrawingSink for ImageSink<'_> {
    fn draw_line(&mut self, from: Point, to: Point) {
        let start = (from.x as isize, from.y as isize);
        let end = (to.x as isize, to.y as isize);

        // Bresenham yields the start point but not the end point, so the end
        // point is painted explicitly. For from == to this paints one pixel.
        for (x, y) in Bresenham::new(start, end) {
            self.put(x, y);
        }
        self.put(end.0, end.1);
    }
}
