use crate::{Effect, monochrome::grayscale};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
    contrast::adaptive_threshold,
    filter::{bilateral::GaussianEuclideanColorDistance, bilateral_filter, median_filter},
};

/// Cartoon stylization: dark outlines from an adaptive threshold of the
/// blurred luminance, laid over an edge-preserving smoothed copy of the color
/// image.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CartoonConfig {
    /// Median blur radius applied to the luminance (2 => 5x5 window).
    #[derivative(Default(value = "2"))]
    pub median_radius: u32,

    /// Adaptive threshold neighbourhood radius (4 => 9x9 block).
    #[derivative(Default(value = "4"))]
    pub block_radius: u32,

    /// Outline where the pixel is not above its local mean minus this.
    #[derivative(Default(value = "9"))]
    pub threshold_offset: i32,

    /// Bilateral window radius (4 => diameter 9).
    #[derivative(Default(value = "4"))]
    pub bilateral_radius: u8,

    #[derivative(Default(value = "300.0"))]
    pub sigma_color: f32,

    #[derivative(Default(value = "300.0"))]
    pub sigma_space: f32,
}

impl CartoonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// White (255) where the pixel is brighter than its local mean minus
    /// the offset, black (0) on outlines.
    pub fn edge_mask(&self, image: &RgbImage) -> GrayImage {
        let gray = grayscale(image);
        if gray.width() == 0 || gray.height() == 0 || self.block_radius == 0 {
            return GrayImage::from_pixel(gray.width(), gray.height(), Luma([255]));
        }

        let blurred = median_filter(&gray, self.median_radius, self.median_radius);
        self.threshold(&blurred)
    }

    fn threshold(&self, gray: &GrayImage) -> GrayImage {
        // `adaptive_threshold` keeps `pixel >= mean - delta`, so one less
        // gives a strict `pixel > mean - offset`. Its mean is floored.
        adaptive_threshold(gray, self.block_radius, self.threshold_offset - 1)
    }

    pub fn smooth(&self, image: &RgbImage) -> RgbImage {
        if image.width() == 0 || image.height() == 0 || self.bilateral_radius == 0 {
            return image.clone();
        }

        bilateral_filter(
            image,
            self.bilateral_radius,
            self.sigma_space,
            GaussianEuclideanColorDistance::new(self.sigma_color),
        )
    }
}

impl Effect for CartoonConfig {
    type Output = RgbImage;

    fn apply(&self, image: &RgbImage) -> RgbImage {
        let edges = self.edge_mask(image);
        let mut color = self.smooth(image);

        for (pixel, edge) in color.pixels_mut().zip(edges.pixels()) {
            if edge.0[0] == 0 {
                *pixel = Rgb([0, 0, 0]);
            }
        }

        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([220, 40, 40])
            } else {
                Rgb([30, 30, 200])
            }
        })
    }

    #[test]
    fn test_smooth_keeps_flat_regions() {
        let flat = RgbImage::from_pixel(12, 8, Rgb([90, 120, 150]));
        let smoothed = CartoonConfig::new().smooth(&flat);

        // The weighted mean is truncated back to u8.
        for pixel in smoothed.pixels() {
            for (out, expected) in pixel.0.iter().zip([90u8, 120, 150]) {
                assert!(out.abs_diff(expected) <= 1, "{:?}", pixel.0);
            }
        }
    }

    #[test]
    fn test_smooth_zero_radius_is_identity() {
        let image = two_tone(10, 6);
        let config = CartoonConfig::new().with_bilateral_radius(0);
        assert_eq!(config.smooth(&image), image);
    }

    #[test]
    fn test_edge_mask_flat_is_white() {
        let flat = RgbImage::from_pixel(16, 16, Rgb([100, 100, 100]));
        let mask = CartoonConfig::new().edge_mask(&flat);
        assert!(mask.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_threshold_offset_is_strict() {
        // Block mean is exactly 99, so the cut sits at 90.
        let block = |center: u8| {
            let mut gray = GrayImage::from_pixel(9, 9, Luma([100]));
            gray.put_pixel(0, 0, Luma([29]));
            gray.put_pixel(4, 4, Luma([center]));
            gray
        };

        let config = CartoonConfig::new();
        assert_eq!(config.threshold(&block(90)).get_pixel(4, 4).0[0], 0);
        assert_eq!(config.threshold(&block(91)).get_pixel(4, 4).0[0], 255);
    }

    #[test]
    fn test_cartoon_outlines_edges() {
        let image = two_tone(32, 16);
        let config = CartoonConfig::new();
        let mask = config.edge_mask(&image);
        let cartoon = config.apply(&image);

        assert_eq!(cartoon.dimensions(), image.dimensions());
        assert!(mask.pixels().any(|p| p.0[0] == 0));
        for (pixel, edge) in cartoon.pixels().zip(mask.pixels()) {
            if edge.0[0] == 0 {
                assert_eq!(pixel.0, [0, 0, 0]);
            }
        }
        // Far from the boundary the color survives.
        assert_ne!(cartoon.get_pixel(0, 8).0, [0, 0, 0]);
    }

    #[test]
    fn test_cartoon_is_deterministic() {
        let image = RgbImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 128]));
        let config = CartoonConfig::new();
        assert_eq!(config.apply(&image), config.apply(&image));
    }

    #[test]
    fn test_cartoon_empty_image() {
        let image = RgbImage::new(0, 0);
        assert_eq!(CartoonConfig::new().apply(&image).dimensions(), (0, 0));
    }
}
