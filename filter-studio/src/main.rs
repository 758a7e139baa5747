use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filter_studio::config::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file, defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu: filter an image file or the camera feed
    #[cfg(feature = "desktop")]
    Local,

    /// Serve the capture page and the processing endpoint
    #[cfg(feature = "web")]
    Serve {
        /// Listen address, overrides `server.address`
        #[arg(short, long)]
        address: Option<String>,
    },

    /// List camera devices
    #[cfg(feature = "desktop")]
    Cameras,
}

fn main() -> Result<()> {
    filter_studio::init_logger();

    let cli = Cli::parse();
    let config = Config::init(cli.config.as_deref())?;
    log::info!("config: {}", config.config_path.display());

    match cli.command {
        #[cfg(feature = "desktop")]
        None | Some(Command::Local) => local(&config),

        #[cfg(not(feature = "desktop"))]
        None => anyhow::bail!("built without the desktop feature, use `serve`"),

        #[cfg(feature = "web")]
        Some(Command::Serve { address }) => serve(&config, address),

        #[cfg(feature = "desktop")]
        Some(Command::Cameras) => cameras(),
    }
}

#[cfg(feature = "desktop")]
fn local(config: &Config) -> Result<()> {
    use filter_studio::logic::{
        display::WindowDisplay,
        interactive::{self, GridRenderer},
        menu::{self, Choice, MenuError},
    };
    use std::io;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let choice = match menu::prompt(&mut stdin.lock(), &mut stdout) {
        Ok(choice) => choice,
        Err(MenuError::InvalidChoice(answer)) => {
            log::warn!("invalid menu choice: {answer:?}");
            println!("Invalid choice!");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let renderer = GridRenderer::from_config(config);
    let mut display = WindowDisplay::new();

    match choice {
        Choice::Image(path) => {
            interactive::run_static(&renderer, &path, &mut display, &mut stdout)?;
        }
        Choice::Webcam => {
            camera::init();

            let mut camera_config = camera::CameraConfig::new().with_index(config.camera.index);
            camera_config.width = config.camera.width;
            camera_config.height = config.camera.height;
            camera_config.fps = config.camera.fps;

            let client = match camera::CameraClient::open(&camera_config) {
                Ok(client) => client,
                Err(e) => {
                    log::warn!("open camera {} failed: {e}", config.camera.index);
                    println!("Cannot open webcam");
                    return Ok(());
                }
            };

            let outcome = interactive::run_live(&renderer, client, &mut display);
            if let Some(e) = outcome.error {
                println!("{e}");
            }
        }
    }

    Ok(())
}

#[cfg(feature = "web")]
fn serve(config: &Config, address: Option<String>) -> Result<()> {
    use filter_studio::logic::{self, server, single_shot::SingleShot, storage::ArtifactStore};

    let store = ArtifactStore::new(&config.storage).with_context(|| {
        format!(
            "create storage directories under {} failed",
            config.storage.root.display()
        )
    })?;
    let single_shot = SingleShot::new(logic::filter_bank(config), store);
    let address = address.unwrap_or_else(|| config.server.address.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(server::run_server(
            single_shot,
            &config.storage,
            config.server.max_body_bytes,
            &address,
        ))
        .with_context(|| format!("serve on {address} failed"))
}

#[cfg(feature = "desktop")]
fn cameras() -> Result<()> {
    camera::init();

    let cameras = camera::camera_info::query_available_cameras()?;
    if cameras.is_empty() {
        println!("No cameras found");
    }

    for camera in cameras {
        println!("{}: {} ({})", camera.index, camera.name, camera.description);
    }

    Ok(())
}
