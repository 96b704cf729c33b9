use std::path::Path;

use image::GrayImage;
use image::Luma;
use imageproc::drawing::draw_antialiased_line_segment_mut;
use imageproc::pixelops::interpolate;

///
/// A canvas image with appropriate handling methods, to generate previews of drawings.
///
/// # Fields:
/// - `width`: The width of the image, in pixels
/// - `height`: The height of the image, in pixels
/// - `scale`: The pixels per millimetre
///
pub struct PreviewCanvas {
    pub width: u32,
    pub height: u32,
    pub scale: u32,

    pub buffer: GrayImage,
}

impl PreviewCanvas {
    ///
    /// Creates a new instance of the image canvas, with a white image buffer.
    ///
    /// # Parameters:
    /// - `paper_width`: The width of the paper in millimetres
    /// - `paper_height`: The height of the paper in millimetres
    /// - `scale`: An optional scale to adjust the preview by, defaults to 1
    ///
    /// # Returns:
    /// - A new `PreviewCanvas` instance
    /// - `None` if the scaled size does not fit in a `u32`
    ///
    pub fn new(paper_width: u32, paper_height: u32, scale: Option<u32>) -> Option<PreviewCanvas> {
        let scale = scale.unwrap_or(1).max(1);

        let width = paper_width.checked_mul(scale)?.max(1);
        let height = paper_height.checked_mul(scale)?.max(1);

        let buffer = GrayImage::from_pixel(width, height, Luma([255]));

        Some(PreviewCanvas { width, height, scale, buffer })
    }

    ///
    /// Saves the preview to a PNG file on the disk.
    ///
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.buffer.save_with_format(path, image::ImageFormat::Png)
    }

    ///
    /// Draws an antialiased line between two points on the canvas, in millimetres from the top
    /// left of the paper. This function respects `scale`. Parts off the canvas are dropped.
    ///
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        draw_antialiased_line_segment_mut(
            &mut self.buffer,
            scale_floor_coordinates(x1, y1, self.scale),
            scale_floor_coordinates(x2, y2, self.scale),
            Luma([0]), interpolate
        );
    }

    ///
    /// # Returns:
    /// - The shade at the pixel, 255 being untouched paper
    ///
    pub fn shade_at(&self, x: u32, y: u32) -> Option<u8> {
        self.buffer.get_pixel_checked(x, y).map(|pixel| pixel.0[0])
    }
}

///
/// Scales and floors an (f64, f64) pair of coordinates. This is to make the values ready to reference
/// pixels on the canvas.
///
fn scale_floor_coordinates(x: f64, y: f64, scale: u32) -> (i32, i32) {
    ((x * scale as f64).floor() as i32, (y * scale as f64).floor() as i32)
}
