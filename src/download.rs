//! Selfie downloads
//!
//! Writes each captured selfie to a file named after its capture time, e.g.
//! `selfie-2025-08-08T15-12-05-123Z.png`, in the user's downloads folder.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::capture::{Downloader, EncodedImage, PersistError};
use crate::config::StorageConfig;

/// Default download directory
///
/// The user's downloads folder, or `~/.cheese/Selfies` if the platform has
/// none.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| crate::config::get_data_dir().join("Selfies"))
}

/// Builds the download filename for `image`
///
/// The timestamp is ISO-8601 in UTC with ':' and '.' replaced by '-'.
pub fn download_file_name(prefix: &str, image: &EncodedImage) -> Result<String, PersistError> {
    let extension = image
        .extension()
        .ok_or_else(|| PersistError::UnsupportedFormat(image.mime_type.clone()))?;

    Ok(format!(
        "{}-{}.{}",
        prefix,
        image.captured_at.format("%Y-%m-%dT%H-%M-%S-%3fZ"),
        extension
    ))
}

/// Saves selfies as files in a directory
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
    prefix: String,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        let dir = config
            .download_dir
            .clone()
            .unwrap_or_else(default_download_dir);
        Self::new(dir, config.file_prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates a new file for `file_name`, adding `-1`, `-2`, ... before the
    /// extension while the name is taken. Never opens an existing file.
    fn create_unique(&self, file_name: &str) -> io::Result<(PathBuf, File)> {
        let (stem, extension) = file_name.rsplit_once('.').unwrap_or((file_name, ""));
        let mut n = 0u32;
        loop {
            let candidate = if n == 0 {
                self.dir.join(file_name)
            } else {
                self.dir.join(format!("{}-{}.{}", stem, n, extension))
            };

            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(file) => return Ok((candidate, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        }
    }
}

impl Downloader for FileDownloader {
    fn download(&self, image: &EncodedImage) -> Result<PathBuf, PersistError> {
        let file_name = download_file_name(&self.prefix, image)?;

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                tracing::error!("Failed to create download directory {:?}: {}", self.dir, e);
                e
            })?;
        }

        let (path, mut file) = self.create_unique(&file_name).map_err(|e| {
            tracing::error!("Failed to create selfie file in {:?}: {}", self.dir, e);
            e
        })?;
        file.write_all(&image.data)?;

        tracing::info!("Saved {} byte selfie to {:?}", image.data.len(), path);
        Ok(path)
    }
}
