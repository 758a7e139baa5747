use camera::{CameraClient, CameraConfig, FrameSource, camera_info::query_available_cameras};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    camera::init();

    let cameras = query_available_cameras()?;
    if cameras.is_empty() {
        log::warn!("No cameras found!");
        return Ok(());
    }

    for camera in &cameras {
        log::info!("{camera:?}");
    }

    let config = CameraConfig::new().with_width(640).with_height(480);
    let mut client = CameraClient::open(&config)?;

    std::fs::create_dir_all("tmp")?;
    for index in 0..30 {
        let mut frame = client.read_frame()?;
        camera::mirror_horizontal(&mut frame);

        if index % 10 == 0 {
            log::info!("Frame #{index}: {}x{}", frame.width(), frame.height());
            frame.save(format!("tmp/camera-{index}.png"))?;
        }
    }

    Ok(())
}
