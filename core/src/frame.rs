use crate::prelude::{SectionError, SectionResult};
use image::RgbaImage;
use ndarray::{s, Array3, ArrayView3};
use std::path::Path;

/// One RGBA pixel.
pub type Rgba = [u8; 4];

pub const CHANNELS: usize = 4;

/// A rendered RGBA buffer laid out as (height, width, channel).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, fill: Rgba) -> Self {
        let mut pixels = Array3::zeros((height, width, CHANNELS));
        for (channel, &value) in fill.iter().enumerate() {
            pixels.slice_mut(s![.., .., channel]).fill(value);
        }
        Self { pixels }
    }

    /// Wraps an existing array; the last axis must hold four channels.
    pub fn from_array(pixels: Array3<u8>) -> Option<Self> {
        if pixels.shape()[2] == CHANNELS {
            Some(Self { pixels })
        } else {
            None
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> SectionResult<Self> {
        let decoded = image::open(path.as_ref())?;
        Ok(Self::from_image(&decoded.to_rgba8()))
    }

    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = Array3::from_shape_vec(
            (height as usize, width as usize, CHANNELS),
            image.as_raw().clone(),
        )
        .unwrap_or_else(|_| Array3::zeros((0, 0, CHANNELS)));
        Self { pixels }
    }

    pub fn width(&self) -> usize {
        self.pixels.shape()[1]
    }

    pub fn height(&self) -> usize {
        self.pixels.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some([
            self.pixels[[y, x, 0]],
            self.pixels[[y, x, 1]],
            self.pixels[[y, x, 2]],
            self.pixels[[y, x, 3]],
        ])
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        for (channel, &value) in color.iter().enumerate() {
            self.pixels[[y, x, channel]] = value;
        }
    }

    /// Source-over blend of `color` at the given opacity; the destination stays opaque.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba, opacity: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width() || y >= self.height() {
            return;
        }
        let alpha = (color[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        for channel in 0..3 {
            let dst = self.pixels[[y, x, channel]] as f32;
            let src = color[channel] as f32;
            self.pixels[[y, x, channel]] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
        self.pixels[[y, x, 3]] = 255;
    }

    /// Draws `source` with its top-left corner at (`left`, `top`), clipping to this frame.
    pub fn draw_frame(&mut self, source: &Frame, left: i64, top: i64, opacity: f32) {
        for y in 0..source.height() {
            for x in 0..source.width() {
                if let Some(color) = source.pixel(x, y) {
                    self.blend_pixel(left + x as i64, top + y as i64, color, opacity);
                }
            }
        }
    }

    /// Row-major RGBA bytes.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().copied().collect()
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width() as u32, self.height() as u32, self.to_raw())
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> SectionResult<()> {
        let image = self.to_image().ok_or_else(|| {
            SectionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "frame buffer does not match its dimensions",
            ))
        })?;
        image.save(path.as_ref())?;
        Ok(())
    }
}
