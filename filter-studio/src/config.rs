use anyhow::{Context, Result, bail};
use log::debug;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const APP_NAME: &str = "filter-studio";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(default)]
    pub server: Server,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default)]
    pub display: Display,

    #[serde(default)]
    pub camera: Camera,

    #[serde(default)]
    pub filter: Filter,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Server {
    #[derivative(Default(value = "\"127.0.0.1:5000\".to_string()"))]
    pub address: String,

    #[derivative(Default(value = "16 * 1024 * 1024"))]
    pub max_body_bytes: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/static/uploads/captured_20240101_120000.jpg`
    #[default]
    Absolute,

    /// `static/uploads/captured_20240101_120000.jpg`
    Relative,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Storage {
    /// Directory served under `mount`.
    #[derivative(Default(value = "PathBuf::from(\"static\")"))]
    pub root: PathBuf,

    #[derivative(Default(value = "\"/static\".to_string()"))]
    pub mount: String,

    #[derivative(Default(value = "\"uploads\".to_string()"))]
    pub upload_dir: String,

    #[derivative(Default(value = "\"processed\".to_string()"))]
    pub processed_dir: String,

    pub path_style: PathStyle,

    #[derivative(Default(value = "90"))]
    pub jpeg_quality: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Display {
    #[derivative(Default(value = "320"))]
    pub tile_width: u32,

    #[derivative(Default(value = "240"))]
    pub tile_height: u32,

    // 0 keeps the tiled size
    #[derivative(Default(value = "960"))]
    pub display_width: u32,

    #[derivative(Default(value = "720"))]
    pub display_height: u32,

    pub font_path: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Camera {
    pub index: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Filter {
    #[derivative(Default(value = "127"))]
    pub binary_threshold: u8,
}

impl Config {
    /// Loads the configuration from `path`, or from the platform config
    /// directory when no path is given.
    pub fn init(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let app_dirs = AppDirs::new(Some(APP_NAME), true)
                    .with_context(|| "no platform config directory")?;
                app_dirs.config_dir.join(format!("{APP_NAME}.toml"))
            }
        };

        if let Some(dir) = config_path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("create config dir {} failed", dir.display()))?;
        }

        let mut config = Config {
            config_path,
            ..Default::default()
        };
        config.load().with_context(|| "load config file failed")?;

        debug!("{:?}", config);
        Ok(config)
    }

    /// Loads configuration from file or creates default if not exists
    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.is_first_run = self.is_first_run;
                    *self = c;
                    Ok(())
                }
                Err(e) => {
                    log::warn!(
                        "parse {} failed, using defaults: {e}",
                        self.config_path.display()
                    );

                    self.is_first_run = true;
                    let mut bak_file = self.config_path.clone().into_os_string();
                    bak_file.push(".bak");
                    _ = fs::copy(&self.config_path, bak_file);
                    self.save()
                }
            },
            Err(_) => {
                self.is_first_run = true;
                self.save()
            }
        }
    }

    /// Saves the current configuration to file
    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config from toml format failed. {e:?}")),
        }
    }
}
