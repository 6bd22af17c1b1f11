use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::domain::error::{AppError, Result};

/// Directory holding request-scoped copies of uploaded files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> std::io::Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn create(&self) -> Result<UploadedFile> {
        let file = Builder::new()
            .prefix("upload-")
            .suffix(".csv")
            .tempfile_in(&self.dir)
            .map_err(|e| AppError::IoError(format!("Failed to create upload file: {}", e)))?;

        Ok(UploadedFile {
            file,
            size: 0,
            max_bytes: self.max_bytes,
        })
    }
}

/// An uploaded file buffered on disk for the lifetime of one request.
///
/// The file is deleted by [`UploadedFile::release`] or, on any other exit
/// path, when the value is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    size: u64,
    max_bytes: u64,
}

impl UploadedFile {
    /// Append one multipart chunk. Runs inline on the worker: a chunk is
    /// small and the file is capped at `max_bytes`.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let next_size = self.size + chunk.len() as u64;
        if next_size > self.max_bytes {
            return Err(AppError::UploadTooLarge(format!(
                "Upload exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        self.file.write_all(chunk)?;
        self.size = next_size;
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.file.flush()?;
        fs::read(self.file.path())
            .map_err(|e| AppError::IoError(format!("Failed to read upload file: {}", e)))
    }

    /// [`UploadedFile::read_bytes`] on the blocking pool. On failure the
    /// upload is dropped, and so removed, on that thread.
    pub async fn read_all(mut self) -> Result<(Self, Vec<u8>)> {
        tokio::task::spawn_blocking(move || -> Result<(Self, Vec<u8>)> {
            let raw = self.read_bytes()?;
            Ok((self, raw))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Upload read task failed: {}", e)))?
    }

    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        if let Err(err) = self.file.close() {
            tracing::warn!(
                error = %err,
                path = %path.display(),
                "Failed to remove upload file"
            );
        }
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
