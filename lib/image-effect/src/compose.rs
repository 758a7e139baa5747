use crate::{FilterResultSet, ImageEffectError, ImageEffectResult, resize::resize_rgb};
use ab_glyph::{FontVec, PxScale};
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgb, RgbImage, imageops};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_text_mut},
    rect::Rect,
};
use std::{fmt, fs, path::Path, sync::Arc};

pub const LABEL_BAR_HEIGHT: u32 = 30;

const LABEL_TEXT_X: i32 = 10;
const LABEL_TEXT_Y: i32 = 4;

pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws a black caption bar with white text over the top-left of a tile.
#[derive(Clone, Derivative)]
#[derivative(Default)]
pub struct Labeler {
    #[derivative(Default(value = "22.0"))]
    scale: f32,
    font: Option<Arc<FontVec>>,
}

impl fmt::Debug for Labeler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Labeler")
            .field("scale", &self.scale)
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Labeler {
    /// A labeler without a font only draws the bar.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_font_file(path: impl AsRef<Path>) -> ImageEffectResult<Self> {
        let data = fs::read(path.as_ref())?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            ImageEffectError::InvalidParameter(format!(
                "invalid font {}: {e}",
                path.as_ref().display()
            ))
        })?;

        Ok(Self {
            font: Some(Arc::new(font)),
            ..Default::default()
        })
    }

    /// First loadable font out of [`FONT_CANDIDATES`].
    pub fn from_system_fonts() -> Self {
        for candidate in FONT_CANDIDATES {
            if !Path::new(candidate).exists() {
                continue;
            }

            match Self::from_font_file(candidate) {
                Ok(labeler) => {
                    log::debug!("label font: {candidate}");
                    return labeler;
                }
                Err(e) => log::warn!("skip font {candidate}: {e}"),
            }
        }

        log::warn!("no usable font found, tiles get caption bars without text");
        Self::new()
    }

    /// Labeled copy of `image`.
    pub fn labeled(&self, image: &RgbImage, text: &str) -> RgbImage {
        let mut labeled = image.clone();
        self.label(&mut labeled, text);
        labeled
    }

    pub fn label(&self, image: &mut RgbImage, text: &str) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let bar = Rect::at(0, 0).of_size(width, LABEL_BAR_HEIGHT.min(height));
        draw_filled_rect_mut(image, bar, Rgb([0, 0, 0]));

        if let Some(font) = &self.font {
            draw_text_mut(
                image,
                Rgb([255, 255, 255]),
                LABEL_TEXT_X,
                LABEL_TEXT_Y,
                PxScale::from(self.scale),
                font.as_ref(),
                text,
            );
        }
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GridConfig {
    #[derivative(Default(value = "(320, 240)"))]
    pub tile_size: (u32, u32),

    #[derivative(Default(value = "3"))]
    pub columns: u32,

    /// Final upscale of the whole grid; `None` keeps the tiled size.
    #[derivative(Default(value = "Some((960, 720))"))]
    pub display_size: Option<(u32, u32)>,
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resizes every raster of the set to a tile, labels it with its filter
/// title and places the tiles row-major in [`crate::FilterKind::ALL`] order.
pub fn compose_grid(
    set: &FilterResultSet,
    labeler: &Labeler,
    config: &GridConfig,
) -> ImageEffectResult<RgbImage> {
    let (tile_width, tile_height) = config.tile_size;
    if tile_width == 0 || tile_height == 0 || config.columns == 0 {
        return Err(ImageEffectError::InvalidParameter(format!(
            "grid tile {tile_width}x{tile_height} with {} columns",
            config.columns
        )));
    }

    let count = set.iter().count() as u32;
    let rows = count.div_ceil(config.columns);
    let mut grid = RgbImage::new(tile_width * config.columns, tile_height * rows);

    for (index, (kind, raster)) in set.iter().enumerate() {
        let mut tile = resize_rgb(&raster.to_rgb(), tile_width, tile_height)?;
        labeler.label(&mut tile, kind.title());

        let index = index as u32;
        let x = (index % config.columns) * tile_width;
        let y = (index / config.columns) * tile_height;
        imageops::replace(&mut grid, &tile, x as i64, y as i64);
    }

    match config.display_size {
        Some((width, height)) => resize_rgb(&grid, width, height),
        None => Ok(grid),
    }
}
