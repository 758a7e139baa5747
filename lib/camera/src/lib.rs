pub mod camera_client;
pub mod camera_info;

pub use camera_client::{CameraClient, CameraConfig};
pub use camera_info::CameraInfo;
pub use image::RgbImage;

pub type CameraResult<T> = Result<T, CameraError>;

#[derive(thiserror::Error, Debug)]
pub enum CameraError {
    #[error("Failed to initialize camera: {0}")]
    InitializationError(String),

    #[error("Failed to start camera: {0}")]
    StartError(String),

    #[error("Failed to stop camera: {0}")]
    StopError(String),

    #[error("No frame available")]
    NoFrameAvailable,

    #[error("Camera error: {0}")]
    NokhwaError(#[from] nokhwa::NokhwaError),
}

/// Anything that yields color frames one at a time, blocking until the
/// next one is ready.
pub trait FrameSource {
    fn read_frame(&mut self) -> CameraResult<RgbImage>;
}

pub fn init() {
    #[cfg(target_os = "macos")]
    nokhwa::nokhwa_initialize(|granted| {
        log::info!("User said {} for nokhwa", granted);
    });
}

/// Flip around the vertical axis so the preview behaves like a mirror.
pub fn mirror_horizontal(image: &mut RgbImage) {
    image::imageops::flip_horizontal_in_place(image);
}
