//! File storage for uploaded images.
//!
//! Files live under a media root and are referenced from the database by
//! their path relative to it (`uploads/transaction/<uuid>.<ext>`). A fresh
//! UUID per upload keeps names collision free.

use std::path::{Component, Path, PathBuf};

use image::ImageFormat;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const TRANSACTION_UPLOAD_DIR: &str = "uploads/transaction";
const DEFAULT_MEDIA_ROOT: &str = "./media";

/// Where uploaded files are written.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl Default for MediaStore {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_ROOT)
    }
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored reference.
    pub fn path(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }

    /// Write a validated image and return its reference.
    pub(crate) async fn store_transaction_image(&self, image: &ValidImage) -> ResultEngine<String> {
        let dir = self.root.join(TRANSACTION_UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        let reference = format!("{TRANSACTION_UPLOAD_DIR}/{file_name}");
        tracing::debug!("stored image {reference}");
        Ok(reference)
    }

    /// Read a stored file back with its content type.
    ///
    /// Returns `None` for references that escape the media root, name an
    /// unknown image format or point at nothing.
    pub async fn read(&self, reference: &str) -> ResultEngine<Option<(Vec<u8>, &'static str)>> {
        let relative = Path::new(reference);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Ok(None);
        }
        let Ok(format) = ImageFormat::from_path(relative) else {
            return Ok(None);
        };

        match tokio::fs::read(self.path(reference)).await {
            Ok(bytes) => Ok(Some((bytes, format.to_mime_type()))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a stored file. Missing files are ignored, other failures only
    /// logged: the row referencing the file is already gone or replaced.
    pub(crate) async fn release(&self, reference: &str) {
        match tokio::fs::remove_file(self.path(reference)).await {
            Ok(()) => tracing::debug!("released image {reference}"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("failed to release image {reference}: {err}"),
        }
    }
}

/// An upload that decoded successfully.
#[derive(Debug)]
pub(crate) struct ValidImage {
    extension: &'static str,
    bytes: Vec<u8>,
}

impl ValidImage {
    pub(crate) fn extension(&self) -> &'static str {
        self.extension
    }
}

fn decode(bytes: Vec<u8>) -> ResultEngine<ValidImage> {
    let format = image::guess_format(&bytes).map_err(|_| {
        EngineError::InvalidImage(
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
                .to_string(),
        )
    })?;
    image::load_from_memory_with_format(&bytes, format)
        .map_err(|err| EngineError::InvalidImage(format!("could not decode image: {err}")))?;

    let extension = match format {
        ImageFormat::Jpeg => "jpg",
        other => other.extensions_str().first().copied().unwrap_or("img"),
    };
    Ok(ValidImage { extension, bytes })
}

/// Check that `bytes` is a decodable image. Decoding runs off the async
/// workers.
pub(crate) async fn validate_image(bytes: Vec<u8>) -> ResultEngine<ValidImage> {
    if bytes.is_empty() {
        return Err(EngineError::InvalidImage(
            "The submitted file is empty.".to_string(),
        ));
    }
    tokio::task::spawn_blocking(move || decode(bytes))
        .await
        .map_err(|err| EngineError::Storage(std::io::Error::other(err)))?
}
