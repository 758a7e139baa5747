use crate::{CameraError, CameraResult, FrameSource};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution},
};

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CameraConfig {
    #[derivative(Default(value = "0"))]
    pub index: u32,

    #[derivative(Default(value = "None"))]
    #[setters[strip_option]]
    pub fps: Option<u32>,

    #[derivative(Default(value = "None"))]
    #[setters[strip_option]]
    pub width: Option<u32>,

    #[derivative(Default(value = "None"))]
    #[setters[strip_option]]
    pub height: Option<u32>,
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Blocking capture client. The stream is stopped when the client is dropped.
pub struct CameraClient {
    camera: Camera,
    is_running: bool,
}

impl CameraClient {
    pub fn new(config: &CameraConfig) -> CameraResult<Self> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(config.index), format)
            .map_err(|e| CameraError::InitializationError(e.to_string()))?;

        if let Some(fps) = config.fps
            && let Err(e) = camera.set_frame_rate(fps)
        {
            log::warn!("camera set frame rate ({fps}) failed: {e}");
        }

        if let Some(w) = config.width
            && let Some(h) = config.height
            && let Err(e) = camera.set_resolution(Resolution::new(w, h))
        {
            log::warn!("camera set resolution ({w} x {h}) failed: {e}");
        }

        Ok(Self {
            camera,
            is_running: false,
        })
    }

    /// Open the camera and start streaming in one step.
    pub fn open(config: &CameraConfig) -> CameraResult<Self> {
        let mut client = Self::new(config)?;
        client.start()?;
        Ok(client)
    }

    pub fn start(&mut self) -> CameraResult<()> {
        self.camera
            .open_stream()
            .map_err(|e| CameraError::StartError(e.to_string()))?;
        self.is_running = true;
        log::info!("camera {} started", self.camera.index());
        Ok(())
    }

    pub fn stop(&mut self) -> CameraResult<()> {
        self.camera
            .stop_stream()
            .map_err(|e| CameraError::StopError(e.to_string()))?;
        self.is_running = false;
        log::info!("camera {} stopped", self.camera.index());
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }
}

impl FrameSource for CameraClient {
    fn read_frame(&mut self) -> CameraResult<RgbImage> {
        if !self.is_running {
            return Err(CameraError::NoFrameAvailable);
        }

        let buffer = self.camera.frame()?;
        let frame = buffer.decode_image::<RgbFormat>()?;

        if frame.width() == 0 || frame.height() == 0 {
            return Err(CameraError::NoFrameAvailable);
        }

        Ok(frame)
    }
}

impl Drop for CameraClient {
    fn drop(&mut self) {
        if self.is_running()
            && let Err(e) = self.stop()
        {
            log::warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_config_setters() {
        let config = CameraConfig::new()
            .with_index(2)
            .with_width(640)
            .with_height(480)
            .with_fps(30);

        assert_eq!(config.index, 2);
        assert_eq!(config.width, Some(640));
        assert_eq!(config.height, Some(480));
        assert_eq!(config.fps, Some(30));
    }

    #[test]
    fn test_camera_config_default() {
        let config = CameraConfig::default();
        assert_eq!(config.index, 0);
        assert!(config.fps.is_none());
        assert!(config.width.is_none() && config.height.is_none());
    }
}
