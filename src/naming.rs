//! Media file naming and allocation.
//!
//! Two kinds of destination exist:
//!
//! - **Persistent** files land under the pictures directory with a
//!   second-resolution timestamp: `IMG_20260116_093012.jpg`. Two captures in
//!   the same second map to the same name; the later one wins.
//! - **Temp** files land in the cache directory with the same timestamp as a
//!   prefix plus a random suffix, created atomically so concurrent callers
//!   never collide: `IMG_20260116_093012a8Kd2q.jpg`.
//!
//! Both return a [`MediaFile`], which is just a path plus its media type. The
//! file is owned by the filesystem from then on.

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};

/// Media kind, which decides prefix and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn prefix(self) -> &'static str {
        match self {
            MediaType::Image => "IMG",
            MediaType::Video => "VID",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Image => "jpg",
            MediaType::Video => "mp4",
        }
    }
}

/// A media file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub media_type: MediaType,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, media_type: MediaType) -> Self {
        Self {
            path: path.into(),
            media_type,
        }
    }

    /// `file://` URI for this file.
    ///
    /// Relative paths are resolved against the current directory first.
    pub fn uri(&self) -> String {
        file_uri(&self.path)
    }
}

/// Build a `file://` URI for a path, percent-encoding as needed.
pub fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match url::Url::from_file_path(&absolute) {
        Ok(url) => url.to_string(),
        // Only reachable for paths the platform cannot express as a URL.
        Err(()) => format!("file://{}", absolute.display()),
    }
}

/// `IMG_yyyyMMdd_HHmmss` for the given instant.
pub fn timestamped_stem(media_type: MediaType, at: DateTime<Local>) -> String {
    format!("{}_{}", media_type.prefix(), at.format("%Y%m%d_%H%M%S"))
}

/// Allocate a persistent media file path in `dir`, creating the directory.
///
/// The file itself is not created; the caller writes it.
pub fn allocate_output_file(dir: &Path, media_type: MediaType) -> io::Result<MediaFile> {
    std::fs::create_dir_all(dir)?;
    let name = format!(
        "{}.{}",
        timestamped_stem(media_type, Local::now()),
        media_type.extension()
    );
    Ok(MediaFile::new(dir.join(name), media_type))
}

/// Create a new, empty, uniquely named media file in `dir` and keep it.
///
/// The directory is created if missing.
pub fn allocate_unique_file(dir: &Path, media_type: MediaType) -> io::Result<MediaFile> {
    std::fs::create_dir_all(dir)?;
    let stem = timestamped_stem(media_type, Local::now());
    let suffix = format!(".{}", media_type.extension());
    let file = tempfile::Builder::new()
        .prefix(&stem)
        .suffix(&suffix)
        .tempfile_in(dir)?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(MediaFile::new(path, media_type))
}
