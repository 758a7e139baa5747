//! Orchestration on top of the filter bank.
//!
//! `single_shot` and `storage` implement the request/response path,
//! `server` exposes it over HTTP, and `interactive` drives the local
//! static and live modes.

pub mod menu;
pub mod single_shot;
pub mod storage;

#[cfg(feature = "web")]
pub mod server;

#[cfg(feature = "desktop")]
pub mod display;

#[cfg(feature = "desktop")]
pub mod interactive;

use crate::config::Config;
use image_effect::{BinaryConfig, FilterBank, GridConfig, Labeler};

/// Filter bank configured from the `[filter]` section.
pub fn filter_bank(config: &Config) -> FilterBank {
    FilterBank::new()
        .with_binary(BinaryConfig::new().with_threshold(config.filter.binary_threshold))
}

/// Grid layout configured from the `[display]` section.
pub fn grid_config(config: &Config) -> GridConfig {
    let display = &config.display;
    let display_size = if display.display_width == 0 || display.display_height == 0 {
        None
    } else {
        Some((display.display_width, display.display_height))
    };

    GridConfig::new()
        .with_tile_size((display.tile_width, display.tile_height))
        .with_display_size(display_size)
}

/// Labeler using the configured font, falling back to the system fonts.
pub fn labeler(config: &Config) -> Labeler {
    if let Some(path) = &config.display.font_path {
        match Labeler::from_font_file(path) {
            Ok(labeler) => return labeler,
            Err(e) => log::warn!("load font {} failed: {e}", path.display()),
        }
    }

    Labeler::from_system_fonts()
}
