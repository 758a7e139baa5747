//! Local static and live modes.

use crate::{config::Config, logic};
use anyhow::Result;
use camera::FrameSource;
use image::RgbImage;
use image_effect::{FilterBank, GridConfig, ImageEffectResult, Labeler, compose_grid};
use std::{fs, io::Write, path::Path};

pub const STATIC_WINDOW_TITLE: &str = "Image Filters (Press any key to close)";
pub const LIVE_WINDOW_TITLE: &str = "Webcam Filters (Press Q to Quit)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    Continue,
    Quit,
}

/// Where composed grids end up.
pub trait GridDisplay {
    /// Shows `frame` and blocks until a key is pressed or the window is closed.
    fn show_until_key(&mut self, title: &str, frame: &RgbImage) -> Result<()>;

    /// Shows `frame` without blocking and reports whether the user asked to quit.
    fn show_frame(&mut self, title: &str, frame: &RgbImage) -> Result<DisplayEvent>;
}

/// Filter bank plus grid layout.
#[derive(Debug, Clone)]
pub struct GridRenderer {
    pub bank: FilterBank,
    pub labeler: Labeler,
    pub grid: GridConfig,
}

impl GridRenderer {
    pub fn new(bank: FilterBank, labeler: Labeler, grid: GridConfig) -> Self {
        Self {
            bank,
            labeler,
            grid,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            logic::filter_bank(config),
            logic::labeler(config),
            logic::grid_config(config),
        )
    }

    pub fn render(&self, image: &RgbImage) -> ImageEffectResult<RgbImage> {
        let set = self.bank.apply(image);
        compose_grid(&set, &self.labeler, &self.grid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticOutcome {
    Shown,
    NotFound,
}

/// Filters one image file and shows the grid until a key is pressed.
pub fn run_static(
    renderer: &GridRenderer,
    path: &Path,
    display: &mut impl GridDisplay,
    out: &mut impl Write,
) -> Result<StaticOutcome> {
    let image = match fs::read(path)
        .map_err(anyhow::Error::from)
        .and_then(|bytes| Ok(image_effect::decode(&bytes)?))
    {
        Ok(image) => image,
        Err(e) => {
            log::warn!("load {} failed: {e}", path.display());
            writeln!(out, "Image not found!")?;
            return Ok(StaticOutcome::NotFound);
        }
    };

    let grid = renderer.render(&image)?;
    display.show_until_key(STATIC_WINDOW_TITLE, &grid)?;
    Ok(StaticOutcome::Shown)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Idle,
    Capturing,
    Filtering,
    Composing,
    Displaying,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveOutcome {
    /// `Stopped` or `Failed`.
    pub state: LiveState,

    /// Grids shown before the loop ended.
    pub frames: u64,

    pub error: Option<String>,
}

fn enter(state: &mut LiveState, next: LiveState) {
    log::trace!("live: {state:?} -> {next:?}");
    *state = next;
}

/// Capture, mirror, filter, compose and show until the user quits or a
/// frame cannot be read. The source is dropped before returning.
pub fn run_live<S: FrameSource>(
    renderer: &GridRenderer,
    mut source: S,
    display: &mut impl GridDisplay,
) -> LiveOutcome {
    let mut state = LiveState::Idle;
    let mut frames = 0;

    let error = loop {
        enter(&mut state, LiveState::Capturing);
        let mut frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => break Some(format!("read frame failed: {e}")),
        };
        camera::mirror_horizontal(&mut frame);

        enter(&mut state, LiveState::Filtering);
        let set = renderer.bank.apply(&frame);

        enter(&mut state, LiveState::Composing);
        let grid = match compose_grid(&set, &renderer.labeler, &renderer.grid) {
            Ok(grid) => grid,
            Err(e) => break Some(format!("compose grid failed: {e}")),
        };

        enter(&mut state, LiveState::Displaying);
        match display.show_frame(LIVE_WINDOW_TITLE, &grid) {
            Ok(event) => {
                frames += 1;
                if event == DisplayEvent::Quit {
                    break None;
                }
            }
            Err(e) => break Some(format!("display failed: {e}")),
        }
    };

    drop(source);

    match error {
        None => enter(&mut state, LiveState::Stopped),
        Some(ref e) => {
            log::warn!("{e}");
            enter(&mut state, LiveState::Failed);
        }
    }

    log::info!("live mode {state:?} after {frames} frames");
    LiveOutcome {
        state,
        frames,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera::{CameraError, CameraResult};
    use image::Rgb;

    #[derive(Default)]
    struct RecordingDisplay {
        titles: Vec<String>,
        sizes: Vec<(u32, u32)>,
        quit_after: Option<usize>,
    }

    impl GridDisplay for RecordingDisplay {
        fn show_until_key(&mut self, title: &str, frame: &RgbImage) -> Result<()> {
            self.titles.push(title.to_string());
            self.sizes.push(frame.dimensions());
            Ok(())
        }

        fn show_frame(&mut self, title: &str, frame: &RgbImage) -> Result<DisplayEvent> {
            self.titles.push(title.to_string());
            self.sizes.push(frame.dimensions());

            Ok(match self.quit_after {
                Some(n) if self.titles.len() >= n => DisplayEvent::Quit,
                _ => DisplayEvent::Continue,
            })
        }
    }

    struct Frames(usize);

    impl FrameSource for Frames {
        fn read_frame(&mut self) -> CameraResult<RgbImage> {
            match self.0 {
                0 => Err(CameraError::NoFrameAvailable),
                _ => {
                    self.0 -= 1;
                    Ok(RgbImage::from_pixel(32, 24, Rgb([10, 200, 30])))
                }
            }
        }
    }

    fn renderer() -> GridRenderer {
        GridRenderer::new(FilterBank::new(), Labeler::new(), GridConfig::new())
    }

    #[test]
    fn test_render_grid_size() {
        let grid = renderer()
            .render(&RgbImage::from_pixel(50, 40, Rgb([1, 2, 3])))
            .unwrap();
        assert_eq!(grid.dimensions(), (960, 720));
    }

    #[test]
    fn test_live_quits_on_key() {
        let mut display = RecordingDisplay {
            quit_after: Some(2),
            ..Default::default()
        };

        let outcome = run_live(&renderer(), Frames(10), &mut display);
        assert_eq!(outcome.state, LiveState::Stopped);
        assert_eq!(outcome.frames, 2);
        assert!(outcome.error.is_none());
        assert!(display.titles.iter().all(|t| t == LIVE_WINDOW_TITLE));
    }

    #[test]
    fn test_live_fails_on_read_error() {
        let mut display = RecordingDisplay::default();

        let outcome = run_live(&renderer(), Frames(3), &mut display);
        assert_eq!(outcome.state, LiveState::Failed);
        assert_eq!(outcome.frames, 3);
        assert!(outcome.error.is_some());
        assert_eq!(display.sizes, vec![(960, 720); 3]);
    }

    #[test]
    fn test_static_missing_file() {
        let mut display = RecordingDisplay::default();
        let mut out = Vec::new();

        let outcome = run_static(
            &renderer(),
            Path::new("no/such/image.jpg"),
            &mut display,
            &mut out,
        )
        .unwrap();

        assert_eq!(outcome, StaticOutcome::NotFound);
        assert_eq!(String::from_utf8(out).unwrap(), "Image not found!\n");
        assert!(display.titles.is_empty());
    }
}
