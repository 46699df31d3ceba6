//! Local filesystem cover storage

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use super::CoverStorage;
use crate::error::AppResult;

/// Moves covers around on the local disk with `tokio::fs`.
///
/// The staging and cover directories should live on the same filesystem,
/// since a rename cannot cross devices.
#[derive(Debug, Clone, Default)]
pub struct LocalCoverStorage;

impl LocalCoverStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CoverStorage for LocalCoverStorage {
    async fn rename(&self, from: &Path, to: &Path) -> AppResult<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(from, to).await?;
        tracing::debug!("Moved {} to {}", from.display(), to.display());
        Ok(())
    }

    async fn discard(&self, path: &Path) -> AppResult<()> {
        fs::remove_file(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_rename_creates_destination_dir() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("staged");
        fs::write(&from, b"cover").await.unwrap();

        let to = dir.path().join("covers").join("Title_Publisher.jpg");
        LocalCoverStorage::new().rename(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).await.unwrap(), b"cover");
    }

    #[tokio::test]
    async fn test_rename_overwrites_existing_cover() {
        let dir = tempfile::tempdir().unwrap();
        let to = dir.path().join("Title_Publisher.jpg");
        fs::write(&to, b"old").await.unwrap();
        let from = dir.path().join("staged");
        fs::write(&from, b"new").await.unwrap();

        LocalCoverStorage::new().rename(&from, &to).await.unwrap();

        assert_eq!(fs::read(&to).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_rename_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalCoverStorage::new()
            .rename(&dir.path().join("nope"), &dir.path().join("out.jpg"))
            .await;
        assert!(matches!(result, Err(AppError::Filesystem(_))));
    }

    #[tokio::test]
    async fn test_discard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staged");
        fs::write(&path, b"unused").await.unwrap();

        LocalCoverStorage::new().discard(&path).await.unwrap();
        assert!(!path.exists());
    }
}
