//! Book model, incoming payload and the normalization between the two

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Values given to optional fields the payload leaves out
pub mod defaults {
    use rust_decimal::Decimal;

    pub const PUBLICATION_YEAR: i32 = 0;
    pub const ISBN: &str = "";
    pub const ACQUISITION_VALUE: Decimal = Decimal::ZERO;
    pub const LOAN_STATUS: &str = "Available";
}

/// A book as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Assigned by the store, absent until the record is persisted
    pub id: Option<i32>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "publisher must not be empty"))]
    pub publisher: String,
    pub publication_year: i32,
    pub isbn: String,
    #[validate(range(min = 0, message = "totalCopies must not be negative"))]
    pub total_copies: i32,
    #[validate(range(min = 0, message = "availableCopies must not be negative"))]
    pub available_copies: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub acquisition_value: Decimal,
    pub loan_status: String,
    /// Set once an uploaded cover has been moved into the cover directory
    pub cover_image_filename: Option<String>,
}

impl BookRecord {
    /// More copies available than owned. Accepted as entered, only reported.
    pub fn has_availability_overflow(&self) -> bool {
        self.available_copies > self.total_copies
    }
}

/// A scalar that may arrive as a JSON number or as text (form fields always
/// arrive as text)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarInput {
    Number(serde_json::Number),
    Text(String),
}

impl ScalarInput {
    fn is_blank(&self) -> bool {
        matches!(self, ScalarInput::Text(s) if s.trim().is_empty())
    }

    /// Parse into `T`. A whole number written with a fractional part
    /// (`3.0`, `"3.0"`) is also accepted where `T` is an integer type.
    fn parse<T: FromStr>(&self) -> Option<T> {
        let raw = match self {
            ScalarInput::Number(n) => n.to_string(),
            ScalarInput::Text(s) => s.trim().to_string(),
        };
        raw.parse::<T>()
            .ok()
            .or_else(|| whole_number(&raw).and_then(|n| n.to_string().parse::<T>().ok()))
    }
}

fn whole_number(raw: &str) -> Option<i64> {
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

impl From<&str> for ScalarInput {
    fn from(s: &str) -> Self {
        ScalarInput::Text(s.to_string())
    }
}

impl From<i32> for ScalarInput {
    fn from(n: i32) -> Self {
        ScalarInput::Number(n.into())
    }
}

/// Book payload as received from clients
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub publication_year: Option<ScalarInput>,
    pub isbn: Option<String>,
    #[schema(value_type = i32)]
    pub total_copies: Option<ScalarInput>,
    #[schema(value_type = i32)]
    pub available_copies: Option<ScalarInput>,
    #[schema(value_type = Option<f64>)]
    pub acquisition_value: Option<ScalarInput>,
    pub loan_status: Option<String>,
}

impl BookInput {
    /// Assign a form field by its payload name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "author" => self.author = Some(value),
            "publisher" => self.publisher = Some(value),
            "publicationYear" => self.publication_year = Some(ScalarInput::Text(value)),
            "isbn" => self.isbn = Some(value),
            "totalCopies" => self.total_copies = Some(ScalarInput::Text(value)),
            "availableCopies" => self.available_copies = Some(ScalarInput::Text(value)),
            "acquisitionValue" => self.acquisition_value = Some(ScalarInput::Text(value)),
            "loanStatus" => self.loan_status = Some(value),
            other => tracing::debug!("Ignoring unknown book field '{}'", other),
        }
    }

    /// Build a complete record, filling optional fields from [`defaults`].
    pub fn normalize(self) -> AppResult<BookRecord> {
        let record = BookRecord {
            id: None,
            title: required_text("title", self.title)?,
            author: required_text("author", self.author)?,
            publisher: required_text("publisher", self.publisher)?,
            publication_year: optional_number("publicationYear", self.publication_year)?
                .unwrap_or(defaults::PUBLICATION_YEAR),
            isbn: self
                .isbn
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| defaults::ISBN.to_string()),
            total_copies: required_number("totalCopies", self.total_copies)?,
            available_copies: required_number("availableCopies", self.available_copies)?,
            acquisition_value: optional_number("acquisitionValue", self.acquisition_value)?
                .unwrap_or(defaults::ACQUISITION_VALUE),
            loan_status: self
                .loan_status
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| defaults::LOAN_STATUS.to_string()),
            cover_image_filename: None,
        };

        record
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(record)
    }
}

fn required_text(field: &str, value: Option<String>) -> AppResult<String> {
    match value.map(|s| s.trim().to_string()) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

fn required_number<T: FromStr>(field: &str, value: Option<ScalarInput>) -> AppResult<T> {
    optional_number(field, value)?
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn optional_number<T: FromStr>(field: &str, value: Option<ScalarInput>) -> AppResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_blank() => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("{} must be a number", field))),
    }
}
