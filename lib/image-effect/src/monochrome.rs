use crate::{Effect, Raster};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, RgbImage};

// BT.601 weights scaled by 2^14: 0.299, 0.587, 0.114
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Luminance-weighted color to gray conversion.
pub fn grayscale(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());

    for (dst, src) in gray.pixels_mut().zip(image.pixels()) {
        let [r, g, b] = src.0;
        let y = (r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        *dst = Luma([y.min(255) as u8]);
    }

    gray
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BinaryConfig {
    /// Samples strictly above this value become white.
    #[derivative(Default(value = "127"))]
    pub threshold: u8,
}

impl BinaryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_gray(&self, gray: &GrayImage) -> GrayImage {
        let mut binary = gray.clone();

        for pixel in binary.pixels_mut() {
            pixel.0[0] = if pixel.0[0] > self.threshold { 255 } else { 0 };
        }

        binary
    }

    pub fn apply_raster(&self, raster: &Raster) -> GrayImage {
        match raster {
            Raster::Gray(gray) => self.apply_gray(gray),
            Raster::Color(color) => self.apply(color),
        }
    }
}

impl Effect for BinaryConfig {
    type Output = GrayImage;

    fn apply(&self, image: &RgbImage) -> GrayImage {
        self.apply_gray(&grayscale(image))
    }
}
