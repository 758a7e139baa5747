use super::storage::{Artifact, ArtifactStore, StoreError, detect_extension};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image_effect::{FilterBank, ImageEffectError};
use std::io;

pub type ProcessResult<T> = Result<T, ProcessError>;

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("Invalid image data: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] image::ImageError),
}

impl ProcessError {
    /// The submission itself was bad, as opposed to a failure on our side.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProcessError::Decode(_))
    }
}

impl From<StoreError> for ProcessError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(e) => ProcessError::Io(e),
            StoreError::Encode(e) => ProcessError::Encode(e),
        }
    }
}

impl From<ImageEffectError> for ProcessError {
    fn from(e: ImageEffectError) -> Self {
        match e {
            ImageEffectError::Decode(msg) => ProcessError::Decode(msg),
            ImageEffectError::Io(e) => ProcessError::Io(e),
            ImageEffectError::Image(e) => ProcessError::Encode(e),
            e => ProcessError::Io(io::Error::other(e.to_string())),
        }
    }
}

/// Removes a leading `data:<mime>;base64,` header if present.
pub fn strip_data_url(payload: &str) -> &str {
    let payload = payload.trim();

    match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(""),
        None => payload,
    }
}

/// Decode, filter and persist one submitted image.
pub struct SingleShot {
    bank: FilterBank,
    store: ArtifactStore,
}

impl SingleShot {
    pub fn new(bank: FilterBank, store: ArtifactStore) -> Self {
        Self { bank, store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Returns the six artifacts in grid order. Nothing is written unless the
    /// payload decodes to an image.
    pub fn process(&self, payload: &str) -> ProcessResult<Vec<Artifact>> {
        let data = strip_data_url(payload);
        if data.is_empty() {
            return Err(ProcessError::Decode("empty payload".to_string()));
        }

        // Line-wrapped payloads are accepted.
        let data = data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect::<Vec<u8>>();

        let bytes = STANDARD
            .decode(&data)
            .map_err(|e| ProcessError::Decode(e.to_string()))?;

        let image = image_effect::decode(&bytes)?;
        log::debug!(
            "decoded {}x{} image from {} bytes",
            image.width(),
            image.height(),
            bytes.len()
        );

        let batch = self.store.claim()?;
        let set = self.bank.apply(&image);

        Ok(self
            .store
            .persist(batch, &bytes, detect_extension(&bytes), &set)?)
    }
}
