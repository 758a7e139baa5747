use image::{ImageBuffer, Pixel, RgbImage};

/// Output rows for R, G and B, applied to an `[r, g, b]` column.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Per-sample inversion, `255 - v`, for gray and color images alike.
pub fn negative<P>(image: &ImageBuffer<P, Vec<u8>>) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let mut inverted = image.clone();

    for sample in inverted.iter_mut() {
        *sample = 255 - *sample;
    }

    inverted
}

/// Warm monochrome tint through [`SEPIA_MATRIX`], clamped to the 8-bit range.
pub fn sepia(image: &RgbImage) -> RgbImage {
    let mut toned = image.clone();

    for pixel in toned.pixels_mut() {
        let [r, g, b] = pixel.0.map(f32::from);
        pixel.0 = SEPIA_MATRIX
            .map(|row| (row[0] * r + row[1] * g + row[2] * b).round().clamp(0.0, 255.0) as u8);
    }

    toned
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};

    #[test]
    fn test_negative_is_involutive() {
        let image = RgbImage::from_fn(17, 9, |x, y| Rgb([x as u8 * 15, y as u8 * 28, 200]));
        assert_eq!(negative(&negative(&image)), image);

        let gray = GrayImage::from_fn(5, 5, |x, y| Luma([(x * 50 + y) as u8]));
        assert_eq!(negative(&negative(&gray)), gray);
    }

    #[test]
    fn test_negative_values() {
        let image = RgbImage::from_pixel(1, 1, Rgb([0, 100, 255]));
        assert_eq!(negative(&image).get_pixel(0, 0).0, [255, 155, 0]);
    }

    #[test]
    fn test_sepia_clamps_white() {
        let toned = sepia(&RgbImage::from_pixel(3, 3, Rgb([255, 255, 255])));
        // The first two rows sum above 1.0 and saturate.
        assert!(toned.pixels().all(|p| p.0 == [255, 255, 239]));
    }

    #[test]
    fn test_sepia_black_stays_black() {
        let toned = sepia(&RgbImage::from_pixel(3, 3, Rgb([0, 0, 0])));
        assert!(toned.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_sepia_mid_gray() {
        let toned = sepia(&RgbImage::from_pixel(1, 1, Rgb([100, 100, 100])));
        assert_eq!(toned.get_pixel(0, 0).0, [135, 120, 94]);
    }
}
