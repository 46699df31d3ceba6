//! Book catalog workflow: normalization, persistence and cover attachment

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookInput, BookRecord},
    repository::BookStore,
    storage::{cover_filename, CoverStorage, UploadedFile},
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
    covers: Arc<dyn CoverStorage>,
    cover_dir: PathBuf,
}

impl BooksService {
    pub fn new(
        store: Arc<dyn BookStore>,
        covers: Arc<dyn CoverStorage>,
        cover_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            covers,
            cover_dir: cover_dir.into(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<BookRecord>> {
        self.store.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<BookRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Store a new book and, when a cover was uploaded, move it in place and
    /// reference it from the record.
    ///
    /// Once the row is stored the call succeeds: a failing cover step is
    /// logged and the record is returned without its cover reference.
    pub async fn create(&self, input: BookInput, cover: Option<UploadedFile>) -> AppResult<BookRecord> {
        let mut record = match input.normalize() {
            Ok(record) => record,
            Err(e) => {
                self.discard_upload(cover.as_ref()).await;
                return Err(e);
            }
        };
        self.warn_on_availability_overflow(&record);

        let id = match self.store.insert(&record).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                self.discard_upload(cover.as_ref()).await;
                return Err(AppError::Persistence("Book could not be created".to_string()));
            }
            Err(e) => {
                self.discard_upload(cover.as_ref()).await;
                return Err(e);
            }
        };
        record.id = Some(id);
        tracing::info!("Created book id={} '{}'", id, record.title);

        if let Some(file) = cover {
            match self.attach_cover(&record, &file).await {
                Ok(filename) => record.cover_image_filename = Some(filename),
                Err(e) => tracing::warn!("Book id={} stored without its cover: {}", id, e),
            }
        }

        Ok(record)
    }

    /// Replace every field of an existing book. `id` is the raw identifying
    /// parameter of the request.
    pub async fn update(&self, id: &str, input: BookInput) -> AppResult<BookRecord> {
        let mut record = input.normalize()?;
        let id = parse_id(id).ok_or_else(|| {
            AppError::Validation(format!("'{}' is not a valid book id", id))
        })?;
        record.id = Some(id);
        self.warn_on_availability_overflow(&record);

        if !self.store.update(&record).await? {
            return Err(AppError::Persistence(format!("Book {} could not be updated", id)));
        }
        tracing::info!("Updated book id={}", id);
        Ok(record)
    }

    /// Remove a book. An identifier that is not an integer matches no book and
    /// is refused like any other unknown id.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let refused = || AppError::Persistence(format!("Book {} could not be deleted", id));

        let Some(parsed) = parse_id(id) else {
            tracing::debug!("Refusing delete of non-numeric book id '{}'", id);
            return Err(refused());
        };
        if !self.store.delete(parsed).await? {
            return Err(refused());
        }
        tracing::info!("Deleted book id={}", parsed);
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }

    async fn attach_cover(&self, record: &BookRecord, file: &UploadedFile) -> AppResult<String> {
        let id = record
            .id
            .ok_or_else(|| AppError::Internal("Cover attached before the book was stored".to_string()))?;
        let filename = cover_filename(&record.title, &record.publisher, &file.extension());
        let destination = self.cover_dir.join(&filename);

        self.covers.rename(&file.temp_path, &destination).await?;
        if !self.store.set_cover_image(&filename, id).await? {
            return Err(AppError::Persistence(format!(
                "Cover reference not recorded for book {}",
                id
            )));
        }
        tracing::debug!("Attached cover {} to book id={}", filename, id);
        Ok(filename)
    }

    async fn discard_upload(&self, file: Option<&UploadedFile>) {
        if let Some(file) = file {
            if let Err(e) = self.covers.discard(&file.temp_path).await {
                tracing::warn!("Failed to discard upload {}: {}", file.temp_path.display(), e);
            }
        }
    }

    fn warn_on_availability_overflow(&self, record: &BookRecord) {
        if record.has_availability_overflow() {
            tracing::warn!(
                "Book '{}' has {} available copies out of {}",
                record.title,
                record.available_copies,
                record.total_copies
            );
        }
    }
}

fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
