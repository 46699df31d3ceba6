//! Books repository for database operations.
//!
//! A refused write (no row matched, nothing returned) is reported through the
//! return value; `Err` is reserved for driver faults.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::book::BookRecord};

const BOOK_COLUMNS: &str = r#"
    id, title, author, publisher, publication_year, isbn,
    total_copies, available_copies, acquisition_value, loan_status,
    cover_image_filename
"#;

/// Persistence of book rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<BookRecord>>;

    async fn get(&self, id: i32) -> AppResult<Option<BookRecord>>;

    /// Returns the assigned id, or `None` when the row was not stored
    async fn insert(&self, record: &BookRecord) -> AppResult<Option<i32>>;

    /// Overwrites every field except the cover reference
    async fn update(&self, record: &BookRecord) -> AppResult<bool>;

    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn set_cover_image(&self, filename: &str, id: i32) -> AppResult<bool>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn list(&self) -> AppResult<Vec<BookRecord>> {
        let query = format!("SELECT {} FROM books ORDER BY title, id", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, BookRecord>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> AppResult<Option<BookRecord>> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let row = sqlx::query_as::<_, BookRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, record: &BookRecord) -> AppResult<Option<i32>> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, publisher, publication_year, isbn,
                               total_copies, available_copies, acquisition_value, loan_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&record.title)
        .bind(&record.author)
        .bind(&record.publisher)
        .bind(record.publication_year)
        .bind(&record.isbn)
        .bind(record.total_copies)
        .bind(record.available_copies)
        .bind(record.acquisition_value)
        .bind(&record.loan_status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, record: &BookRecord) -> AppResult<bool> {
        let Some(id) = record.id else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author = $2, publisher = $3, publication_year = $4, isbn = $5,
                total_copies = $6, available_copies = $7, acquisition_value = $8,
                loan_status = $9, updated_at = NOW()
            WHERE id = $10
            "#,
        )
        .bind(&record.title)
        .bind(&record.author)
        .bind(&record.publisher)
        .bind(record.publication_year)
        .bind(&record.isbn)
        .bind(record.total_copies)
        .bind(record.available_copies)
        .bind(record.acquisition_value)
        .bind(&record.loan_status)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_cover_image(&self, filename: &str, id: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE books SET cover_image_filename = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(filename)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
