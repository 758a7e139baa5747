use crate::{
    Effect, FilterKind, Raster,
    monochrome::{BinaryConfig, grayscale},
    stylized::CartoonConfig,
    tone::{negative, sepia},
};
use derive_setters::Setters;
use image::RgbImage;

/// Runs all five filters over one input image.
#[derive(Debug, Clone, Default, Setters)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct FilterBank {
    pub binary: BinaryConfig,
    pub cartoon: CartoonConfig,
}

impl FilterBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, image: &RgbImage) -> FilterResultSet {
        let gray = grayscale(image);
        let binary = self.binary.apply_gray(&gray);

        log::trace!(
            "filter bank on {}x{} image",
            image.width(),
            image.height()
        );

        FilterResultSet {
            rasters: [
                Raster::Color(image.clone()),
                Raster::Gray(gray),
                Raster::Gray(binary),
                Raster::Color(negative(image)),
                Raster::Color(sepia(image)),
                Raster::Color(self.cartoon.apply(image)),
            ],
        }
    }
}

/// The original image plus its five derived rasters, indexed by [`FilterKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResultSet {
    rasters: [Raster; 6],
}

impl FilterResultSet {
    pub fn get(&self, kind: FilterKind) -> &Raster {
        &self.rasters[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKind, &Raster)> {
        FilterKind::ALL.into_iter().zip(self.rasters.iter())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.rasters[0].dimensions()
    }
}
