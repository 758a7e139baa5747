//! Fixed filter bank for the filter studio.
//!
//! Five deterministic transforms (grayscale, binary, negative, sepia and
//! cartoon) plus the helpers needed to present their results: a label
//! drawer and a 2x3 grid composer.

pub mod compose;
pub mod filter_bank;
pub mod monochrome;
pub mod resize;
pub mod stylized;
pub mod tone;

pub use compose::{GridConfig, Labeler, compose_grid};
pub use filter_bank::{FilterBank, FilterResultSet};
pub use monochrome::BinaryConfig;
pub use stylized::CartoonConfig;
pub use image::{GrayImage, RgbImage};

use image::DynamicImage;
use num_enum::{IntoPrimitive, TryFromPrimitive};

pub type ImageEffectResult<T> = Result<T, ImageEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageEffectError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Fast image buffer error: {0}")]
    FastImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Fast image resize error: {0}")]
    FastImageResize(#[from] fast_image_resize::ResizeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A transform from a color image to some derived raster.
pub trait Effect {
    type Output;

    fn apply(&self, image: &RgbImage) -> Self::Output;
}

/// Entries of a [`FilterResultSet`], in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FilterKind {
    Original = 0,
    Grayscale,
    Binary,
    Negative,
    Sepia,
    Cartoon,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Original,
        FilterKind::Grayscale,
        FilterKind::Binary,
        FilterKind::Negative,
        FilterKind::Sepia,
        FilterKind::Cartoon,
    ];

    /// Name used on the wire and in JSON responses.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Original => "original",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Binary => "binary",
            FilterKind::Negative => "negative",
            FilterKind::Sepia => "sepia",
            FilterKind::Cartoon => "cartoon",
        }
    }

    /// Title drawn over the tile in the display grid.
    pub fn title(&self) -> &'static str {
        match self {
            FilterKind::Original => "Original",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Binary => "Binary",
            FilterKind::Negative => "Negative",
            FilterKind::Sepia => "Sepia",
            FilterKind::Cartoon => "Cartoon",
        }
    }

    pub fn index(&self) -> usize {
        u8::from(*self) as usize
    }
}

/// An 8-bit raster with one or three channels.
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    Gray(GrayImage),
    Color(RgbImage),
}

impl Raster {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Raster::Gray(image) => image.dimensions(),
            Raster::Color(image) => image.dimensions(),
        }
    }

    pub fn channel_count(&self) -> u8 {
        match self {
            Raster::Gray(_) => 1,
            Raster::Color(_) => 3,
        }
    }

    pub fn as_gray(&self) -> Option<&GrayImage> {
        match self {
            Raster::Gray(image) => Some(image),
            Raster::Color(_) => None,
        }
    }

    pub fn as_rgb(&self) -> Option<&RgbImage> {
        match self {
            Raster::Gray(_) => None,
            Raster::Color(image) => Some(image),
        }
    }

    /// Three-channel copy; gray samples are replicated into every channel.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Raster::Gray(image) => DynamicImage::ImageLuma8(image.clone()).to_rgb8(),
            Raster::Color(image) => image.clone(),
        }
    }

    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Raster::Gray(image) => DynamicImage::ImageLuma8(image.clone()),
            Raster::Color(image) => DynamicImage::ImageRgb8(image.clone()),
        }
    }
}

/// Decode encoded image bytes (JPEG or PNG) into an RGB raster.
pub fn decode(bytes: &[u8]) -> ImageEffectResult<RgbImage> {
    if bytes.is_empty() {
        return Err(ImageEffectError::Decode("empty image data".to_string()));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| ImageEffectError::Decode(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(ImageEffectError::Decode("image has no pixels".to_string()));
    }

    Ok(image.to_rgb8())
}
