//! Where token documents come from
//!
//! A `DocumentSource` yields the raw text of one document. `FileDocument`
//! reads from disk with the compile-time size limit applied before reading;
//! `InlineDocument` serves text held in memory (tests, embedders).

use super::error::StoreError;
use crate::config::compile_time::documents::{LARGE_DOCUMENT_THRESHOLD, MAX_DOCUMENT_SIZE};
use crate::logging::codes;
use crate::{log_debug, log_error, log_warning};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub trait DocumentSource: Send + Sync {
    /// Identifier used in errors and as the logging source
    fn identifier(&self) -> String;

    /// Read the full document text
    fn read(&self) -> Result<String, StoreError>;
}

/// A token document on disk
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_document_size() -> u64 {
        MAX_DOCUMENT_SIZE
    }

    fn check_metadata(&self) -> Result<u64, StoreError> {
        let document = self.identifier();

        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::NotFound => "file not found".to_string(),
                    ErrorKind::PermissionDenied => "permission denied".to_string(),
                    _ => format!("failed to read metadata: {}", e),
                };
                let error = StoreError::source_unavailable(&document, reason);
                log_error!(error.error_code(), "Token document is not accessible",
                    "document" => &document,
                    "io_error" => e);
                return Err(error);
            }
        };

        if !metadata.is_file() {
            let error = StoreError::source_unavailable(&document, "path is not a file");
            log_error!(error.error_code(), "Token source path is not a file", "document" => &document);
            return Err(error);
        }

        let size = metadata.len();
        if size > MAX_DOCUMENT_SIZE {
            let error = StoreError::source_unavailable(
                &document,
                format!("{} bytes exceeds the {} byte limit", size, MAX_DOCUMENT_SIZE),
            );
            log_error!(codes::store::DOCUMENT_TOO_LARGE, "Token document exceeds maximum size",
                "document" => &document,
                "size_bytes" => size,
                "limit_bytes" => MAX_DOCUMENT_SIZE);
            return Err(error);
        }

        if size > LARGE_DOCUMENT_THRESHOLD {
            log_warning!("Large token document",
                "document" => &document,
                "size_bytes" => size,
                "threshold_bytes" => LARGE_DOCUMENT_THRESHOLD);
        }

        Ok(size)
    }
}

impl DocumentSource for FileDocument {
    fn identifier(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<String, StoreError> {
        let size = self.check_metadata()?;

        let bytes = fs::read(&self.path).map_err(|e| {
            let document = self.identifier();
            let reason = match e.kind() {
                ErrorKind::PermissionDenied => "permission denied".to_string(),
                _ => format!("read failed: {}", e),
            };
            let error = StoreError::source_unavailable(&document, reason);
            log_error!(error.error_code(), "Failed to read token document",
                "document" => &document,
                "io_error" => e);
            error
        })?;

        match String::from_utf8(bytes) {
            Ok(text) => {
                log_debug!("Token document read", "document" => self.identifier(), "bytes" => size);
                Ok(text)
            }
            Err(e) => {
                let document = self.identifier();
                let error = StoreError::malformed(
                    &document,
                    format!("document is not valid UTF-8 (byte {})", e.utf8_error().valid_up_to()),
                );
                log_error!(error.error_code(), "Token document is not valid UTF-8",
                    "document" => &document);
                Err(error)
            }
        }
    }
}

/// A token document held in memory
#[derive(Debug, Clone)]
pub struct InlineDocument {
    name: String,
    contents: String,
}

impl InlineDocument {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

impl DocumentSource for InlineDocument {
    fn identifier(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> Result<String, StoreError> {
        if self.contents.len() as u64 > MAX_DOCUMENT_SIZE {
            let error = StoreError::source_unavailable(&self.name, "inline document exceeds size limit");
            log_error!(codes::store::DOCUMENT_TOO_LARGE, "Inline token document exceeds maximum size",
                "document" => &self.name,
                "size_bytes" => self.contents.len());
            return Err(error);
        }
        Ok(self.contents.clone())
    }
}
