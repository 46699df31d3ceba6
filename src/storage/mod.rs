//! Cover image storage
//!
//! Uploaded covers are first written to a temporary location by the HTTP
//! layer, then moved under a name derived from the book itself. Two books
//! with the same sanitized title and publisher share a filename, so the later
//! upload replaces the earlier file.

mod local;

pub use local::LocalCoverStorage;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// A file part received with a request, already written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub temp_path: PathBuf,
    /// Filename as sent by the client
    pub original_name: String,
}

impl UploadedFile {
    /// Extension of the client filename including the leading dot, or an
    /// empty string when there is none
    pub fn extension(&self) -> String {
        Path::new(&self.original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }
}

/// Filesystem operations needed to attach a cover to a book
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoverStorage: Send + Sync {
    /// Move a staged upload to its final location
    async fn rename(&self, from: &Path, to: &Path) -> AppResult<()>;

    /// Remove a staged upload that will not be used
    async fn discard(&self, path: &Path) -> AppResult<()>;
}

/// Keep ASCII letters, digits, space, `-` and `_`, then turn spaces into `_`.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .replace(' ', "_")
}

/// Filename under which a book's cover is stored
pub fn cover_filename(title: &str, publisher: &str, extension: &str) -> String {
    format!(
        "{}_{}{}",
        sanitize_component(title),
        sanitize_component(publisher),
        extension
    )
}
