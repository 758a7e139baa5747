use crate::config::{PathStyle, Storage};
use image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder, codecs::png::PngEncoder};
use image_effect::{FilterKind, FilterResultSet, Raster};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, ErrorKind, Write},
    path::PathBuf,
};

pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const MAX_CLAIM_ATTEMPTS: u32 = 1000;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Source of batch stamps.
pub trait Clock: Send + Sync {
    fn stamp(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn stamp(&self) -> String {
        chrono::Local::now().format(STAMP_FORMAT).to_string()
    }
}

/// Always returns the same stamp.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn stamp(&self) -> String {
        self.0.clone()
    }
}

/// One file written for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: FilterKind,
    pub path: PathBuf,

    /// What the client uses to fetch the file.
    pub location: String,
}

/// A claimed batch stamp. Holds the already created grayscale file.
#[derive(Debug)]
pub struct Batch {
    stamp: String,
    gray_file: File,
}

impl Batch {
    pub fn stamp(&self) -> &str {
        &self.stamp
    }
}

pub fn file_prefix(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Original => "captured",
        FilterKind::Grayscale => "gray",
        FilterKind::Binary => "binary",
        FilterKind::Negative => "neg",
        FilterKind::Sepia => "sepia",
        FilterKind::Cartoon => "cartoon",
    }
}

fn derived_extension(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Binary => "png",
        _ => "jpg",
    }
}

/// Writes submissions to the upload and processed directories.
pub struct ArtifactStore {
    root: PathBuf,
    mount: String,
    upload_dir: String,
    processed_dir: String,
    path_style: PathStyle,
    jpeg_quality: u8,
    clock: Box<dyn Clock>,
}

impl ArtifactStore {
    /// Creates both directories when they are missing.
    pub fn new(storage: &Storage) -> StoreResult<Self> {
        let store = Self {
            root: storage.root.clone(),
            mount: storage.mount.trim_end_matches('/').to_string(),
            upload_dir: storage.upload_dir.clone(),
            processed_dir: storage.processed_dir.clone(),
            path_style: storage.path_style,
            jpeg_quality: storage.jpeg_quality.clamp(1, 100),
            clock: Box::new(SystemClock),
        };

        fs::create_dir_all(store.upload_path())?;
        fs::create_dir_all(store.processed_path())?;

        log::debug!(
            "artifact store: uploads {}, processed {}",
            store.upload_path().display(),
            store.processed_path().display()
        );

        Ok(store)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn upload_path(&self) -> PathBuf {
        self.root.join(&self.upload_dir)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.root.join(&self.processed_dir)
    }

    fn file_path(&self, kind: FilterKind, stamp: &str, ext: &str) -> (PathBuf, String) {
        let dir = match kind {
            FilterKind::Original => &self.upload_dir,
            _ => &self.processed_dir,
        };
        let name = format!("{}_{stamp}.{ext}", file_prefix(kind));

        let location = match self.path_style {
            PathStyle::Absolute => format!("{}/{dir}/{name}", self.mount),
            PathStyle::Relative => {
                let root = self.root.to_string_lossy().replace('\\', "/");
                format!("{}/{dir}/{name}", root.trim_end_matches('/'))
            }
        };

        (self.root.join(dir).join(name), location)
    }

    /// Reserves a stamp no earlier batch used by creating its grayscale file.
    /// A taken second gets `_1`, `_2`, ... appended.
    pub fn claim(&self) -> StoreResult<Batch> {
        let base = self.clock.stamp();

        for attempt in 0..MAX_CLAIM_ATTEMPTS {
            let stamp = match attempt {
                0 => base.clone(),
                n => format!("{base}_{n}"),
            };

            let (gray_path, _) = self.file_path(
                FilterKind::Grayscale,
                &stamp,
                derived_extension(FilterKind::Grayscale),
            );

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&gray_path)
            {
                Ok(gray_file) => {
                    if attempt > 0 {
                        log::info!("stamp {base} already used, claimed {stamp}");
                    }

                    return Ok(Batch { stamp, gray_file });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free stamp for {base}"),
        )
        .into())
    }

    /// Writes the unmodified upload and the five derived images. A failed
    /// batch gives its claimed stamp back.
    pub fn persist(
        &self,
        batch: Batch,
        original: &[u8],
        original_ext: &str,
        set: &FilterResultSet,
    ) -> StoreResult<Vec<Artifact>> {
        let stamp = batch.stamp.clone();

        self.write_batch(batch, original, original_ext, set)
            .inspect_err(|e| {
                log::warn!("store batch {stamp} failed: {e}");

                let (gray_path, _) = self.file_path(
                    FilterKind::Grayscale,
                    &stamp,
                    derived_extension(FilterKind::Grayscale),
                );
                if let Err(e) = fs::remove_file(&gray_path) {
                    log::warn!("remove {} failed: {e}", gray_path.display());
                }
            })
    }

    fn write_batch(
        &self,
        batch: Batch,
        original: &[u8],
        original_ext: &str,
        set: &FilterResultSet,
    ) -> StoreResult<Vec<Artifact>> {
        let Batch { stamp, gray_file } = batch;

        let mut artifacts = Vec::with_capacity(FilterKind::ALL.len());

        let (path, location) = self.file_path(FilterKind::Original, &stamp, original_ext);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(original)?;
        artifacts.push(Artifact {
            kind: FilterKind::Original,
            path,
            location,
        });

        let mut gray_file = Some(gray_file);
        for (kind, raster) in set.iter().filter(|(kind, _)| *kind != FilterKind::Original) {
            let ext = derived_extension(kind);
            let (path, location) = self.file_path(kind, &stamp, ext);

            let file = match gray_file.take_if(|_| kind == FilterKind::Grayscale) {
                Some(file) => file,
                None => File::create(&path)?,
            };

            self.encode(raster, ext, BufWriter::new(file))?;
            artifacts.push(Artifact {
                kind,
                path,
                location,
            });
        }

        log::info!("stored batch {stamp}");
        Ok(artifacts)
    }

    fn encode(&self, raster: &Raster, ext: &str, mut writer: impl Write) -> StoreResult<()> {
        let (width, height) = raster.dimensions();
        let (data, color) = match raster {
            Raster::Gray(image) => (image.as_raw(), ExtendedColorType::L8),
            Raster::Color(image) => (image.as_raw(), ExtendedColorType::Rgb8),
        };

        match ext {
            "png" => PngEncoder::new(&mut writer).write_image(data, width, height, color)?,
            _ => JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality)
                .write_image(data, width, height, color)?,
        }

        writer.flush()?;
        Ok(())
    }
}

/// File extension for encoded image bytes.
pub fn detect_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("jpg")
}
