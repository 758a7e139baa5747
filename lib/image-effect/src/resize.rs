use crate::{ImageEffectError, ImageEffectResult};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FastImage};
use image::RgbImage;

/// Bilinear convolution resize of an RGB image to exactly `width` x `height`.
pub fn resize_rgb(image: &RgbImage, width: u32, height: u32) -> ImageEffectResult<RgbImage> {
    if width == 0 || height == 0 {
        return Err(ImageEffectError::InvalidParameter(format!(
            "resize target {width}x{height} is empty"
        )));
    }

    if image.width() == 0 || image.height() == 0 {
        return Err(ImageEffectError::InvalidParameter(
            "resize source is empty".to_string(),
        ));
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let src = FastImage::from_vec_u8(
        image.width(),
        image.height(),
        image.as_raw().clone(),
        PixelType::U8x3,
    )?;
    let mut dst = FastImage::new(width, height, PixelType::U8x3);

    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    Resizer::new().resize(&src, &mut dst, &resize_options)?;

    RgbImage::from_raw(width, height, dst.into_vec())
        .ok_or(ImageEffectError::InvalidParameter("to RgbImage failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_resize_dimensions() {
        let image = RgbImage::from_pixel(64, 48, Rgb([12, 34, 56]));
        let resized = resize_rgb(&image, 320, 240).unwrap();

        assert_eq!(resized.dimensions(), (320, 240));
        assert!(resized.pixels().all(|p| p.0 == [12, 34, 56]));
    }

    #[test]
    fn test_resize_rejects_empty_target() {
        let image = RgbImage::new(4, 4);
        assert!(matches!(
            resize_rgb(&image, 0, 10),
            Err(ImageEffectError::InvalidParameter(_))
        ));
    }
}
