//! Transient storage for uploaded import files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::ImportError;

/// An uploaded file spooled to a named temp file.
///
/// The temp file is removed when this value is dropped, so every exit path of
/// the import (success, row failures, parse failure, early return) cleans up.
#[derive(Debug)]
pub struct UploadedFile {
    temp: NamedTempFile,
    original_name: Option<String>,
    len: usize,
    max_bytes: usize,
}

impl UploadedFile {
    /// Create an empty spool in `dir` (system temp dir when `None`).
    pub fn create(
        dir: Option<&Path>,
        original_name: Option<String>,
        max_bytes: usize,
    ) -> Result<Self, ImportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("stockroom-upload-").suffix(".csv");
        let temp = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(ImportError::Io)?;

        Ok(Self {
            temp,
            original_name,
            len: 0,
            max_bytes,
        })
    }

    /// Spool a complete in-memory body.
    pub fn from_bytes(
        dir: Option<&Path>,
        original_name: Option<String>,
        bytes: &[u8],
    ) -> Result<Self, ImportError> {
        let mut upload = Self::create(dir, original_name, usize::MAX)?;
        upload.append(bytes)?;
        Ok(upload)
    }

    /// Append a chunk, enforcing the size limit.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), ImportError> {
        let len = self.len.saturating_add(chunk.len());
        if len > self.max_bytes {
            return Err(ImportError::TooLarge {
                limit: self.max_bytes,
            });
        }
        self.temp.write_all(chunk).map_err(ImportError::Io)?;
        self.len = len;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) async fn read_contents(&mut self) -> Result<Vec<u8>, ImportError> {
        self.temp.flush().map_err(ImportError::Io)?;
        tokio::fs::read(self.temp.path()).await.map_err(ImportError::Io)
    }
}
