use super::interactive::{DisplayEvent, GridDisplay};
use anyhow::Result;
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

const TARGET_FPS: usize = 30;

/// `minifb` window. Live frames reuse one window while title and size stay
/// the same.
#[derive(Default)]
pub struct WindowDisplay {
    window: Option<Window>,
    title: String,
    buffer: Vec<u32>,
}

impl WindowDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn window(&mut self, title: &str, width: usize, height: usize) -> Result<&mut Window> {
        let reusable = self.title == title
            && self
                .window
                .as_ref()
                .is_some_and(|w| w.is_open() && w.get_size() == (width, height));

        if !reusable {
            let mut window = Window::new(title, width, height, WindowOptions::default())?;
            window.set_target_fps(TARGET_FPS);
            self.title = title.to_string();
            self.window = Some(window);
        }

        self.window
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("no window"))
    }
}

/// Packs RGB samples as `0RGB` words.
pub fn fill_buffer(frame: &RgbImage, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(
        frame
            .pixels()
            .map(|p| ((p.0[0] as u32) << 16) | ((p.0[1] as u32) << 8) | p.0[2] as u32),
    );
}

/// Q pressed since the previous frame, even if already released.
fn quit_requested(pressed: &[Key]) -> bool {
    pressed.contains(&Key::Q)
}

impl GridDisplay for WindowDisplay {
    fn show_until_key(&mut self, title: &str, frame: &RgbImage) -> Result<()> {
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        let mut buffer = std::mem::take(&mut self.buffer);
        fill_buffer(frame, &mut buffer);

        let window = self.window(title, width, height)?;
        while window.is_open() {
            window.update_with_buffer(&buffer, width, height)?;
            if !window.get_keys_pressed(KeyRepeat::No).is_empty() {
                break;
            }
        }

        self.window = None;
        self.buffer = buffer;
        Ok(())
    }

    fn show_frame(&mut self, title: &str, frame: &RgbImage) -> Result<DisplayEvent> {
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        let mut buffer = std::mem::take(&mut self.buffer);
        fill_buffer(frame, &mut buffer);

        let window = self.window(title, width, height)?;
        window.update_with_buffer(&buffer, width, height)?;

        let quit = quit_requested(&window.get_keys_pressed(KeyRepeat::No));
        let event = if !window.is_open() || quit {
            DisplayEvent::Quit
        } else {
            DisplayEvent::Continue
        };

        if event == DisplayEvent::Quit {
            self.window = None;
        }
        self.buffer = buffer;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_fill_buffer() {
        let frame = RgbImage::from_fn(2, 1, |x, _| match x {
            0 => Rgb([0x12, 0x34, 0x56]),
            _ => Rgb([0xff, 0x00, 0x80]),
        });

        let mut buffer = vec![7; 10];
        fill_buffer(&frame, &mut buffer);
        assert_eq!(buffer, vec![0x0012_3456, 0x00ff_0080]);
    }

    #[test]
    fn test_quit_requested() {
        assert!(quit_requested(&[Key::A, Key::Q]));
        assert!(!quit_requested(&[Key::W]));
        assert!(!quit_requested(&[]));
    }
}
