//! Shared media library seam for the camera-roll target.
//!
//! The router hands a decoded bitmap plus optional title and description to a
//! [`MediaLibrary`] and gets back a URI for the stored item. What "stored"
//! means is up to the implementation.
//!
//! [`DirectoryMediaLibrary`] keeps items as JPEG files in one directory. When
//! a title or description is given it writes a JSON sidecar next to the
//! image (`IMG_….jpg` + `IMG_….json`).

use crate::imaging::{BackendError, Quality, encode_jpeg};
use crate::naming::{MediaType, allocate_unique_file};
use image::DynamicImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MediaStoreError {
    #[error("Media library I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Media library could not encode image: {0}")]
    Encode(#[from] BackendError),
    #[error("Media library could not write metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub trait MediaLibrary: Send + Sync {
    /// Store `image` and return its URI.
    fn insert_image(
        &self,
        image: &DynamicImage,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<String, MediaStoreError>;
}

#[derive(Debug, Serialize)]
struct Sidecar<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Media library backed by a plain directory.
#[derive(Debug, Clone)]
pub struct DirectoryMediaLibrary {
    dir: PathBuf,
    quality: Quality,
}

impl DirectoryMediaLibrary {
    pub fn new(dir: impl Into<PathBuf>, quality: Quality) -> Self {
        Self {
            dir: dir.into(),
            quality,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MediaLibrary for DirectoryMediaLibrary {
    fn insert_image(
        &self,
        image: &DynamicImage,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<String, MediaStoreError> {
        let bytes = encode_jpeg(image, self.quality)?;
        let file = allocate_unique_file(&self.dir, MediaType::Image)?;
        std::fs::write(&file.path, &bytes)?;

        if title.is_some() || description.is_some() {
            let sidecar = Sidecar { title, description };
            let json = serde_json::to_string_pretty(&sidecar)?;
            std::fs::write(file.path.with_extension("json"), json)?;
        }

        let uri = file.uri();
        info!(uri = %uri, "Inserted image into media library");
        Ok(uri)
    }
}
