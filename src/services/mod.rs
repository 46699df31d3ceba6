//! Business logic services

pub mod books;

use std::path::PathBuf;
use std::sync::Arc;

use crate::{repository::Repository, storage::LocalCoverStorage};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, cover_dir: PathBuf) -> Self {
        Self {
            books: books::BooksService::new(
                Arc::new(repository.books),
                Arc::new(LocalCoverStorage::new()),
                cover_dir,
            ),
        }
    }
}
