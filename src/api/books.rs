//! Book catalog endpoints
//!
//! Each operation maps its outcome to its own status codes instead of the
//! generic [`AppError`] mapping: a refused delete answers 401, and an
//! unexpected fault during update still answers 200 with an error message.

use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::{Multipart, WithRejection};
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, MessageResponse},
    models::book::{BookInput, BookRecord},
    storage::UploadedFile,
    AppState,
};

/// Multipart field carrying the cover image
pub const COVER_FIELD: &str = "coverImage";

#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i32,
}

/// Book fields plus an optional cover, from either a JSON body or a
/// `multipart/form-data` form
pub struct BookForm {
    pub input: BookInput,
    pub cover: Option<UploadedFile>,
}

#[async_trait]
impl FromRequest<AppState> for BookForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let Json(input) = Json::<BookInput>::from_request(req, state).await?;
            return Ok(BookForm { input, cover: None });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut staged = None;
        match read_form(multipart, state, &mut staged).await {
            Ok(input) => Ok(BookForm {
                input,
                cover: staged,
            }),
            Err(e) => {
                if let Some(file) = staged {
                    if let Err(remove_err) = fs::remove_file(&file.temp_path).await {
                        tracing::warn!(
                            "Failed to discard upload {}: {}",
                            file.temp_path.display(),
                            remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }
}

/// Collect text fields into a [`BookInput`] and stream the cover part, if
/// any, into the upload staging directory.
async fn read_form(
    mut multipart: Multipart,
    state: &AppState,
    staged: &mut Option<UploadedFile>,
) -> AppResult<BookInput> {
    let bad_form = |e: axum_extra::extract::multipart::MultipartError| {
        AppError::BadRequest(format!("Invalid form data: {}", e))
    };
    let mut input = BookInput::default();

    while let Some(mut field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();

        if name != COVER_FIELD {
            let value = field.text().await.map_err(bad_form)?;
            input.set_field(&name, value);
            continue;
        }

        // Browsers send an empty part when no file was picked
        let Some(original_name) = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
        else {
            continue;
        };
        if staged.is_some() {
            return Err(AppError::BadRequest(format!(
                "Only one '{}' file is accepted",
                COVER_FIELD
            )));
        }

        let temp_dir = &state.config.uploads.temp_dir;
        fs::create_dir_all(temp_dir).await?;
        let temp_path = temp_dir.join(Uuid::new_v4().to_string());
        let mut file = fs::File::create(&temp_path).await?;
        *staged = Some(UploadedFile {
            temp_path,
            original_name,
        });

        while let Some(chunk) = field.chunk().await.map_err(bad_form)? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
    }

    Ok(input)
}

fn reply(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(MessageResponse::new(message))).into_response()
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<BookRecord>),
        (status = 400, description = "Books could not be retrieved", body = MessageResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> Response {
    match state.services.books.list().await {
        Ok(books) => Json(books).into_response(),
        Err(e) => reply(
            StatusCode::BAD_REQUEST,
            e.client_message("Error retrieving books"),
        ),
    }
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookRecord),
        (status = 400, description = "Invalid book ID", body = MessageResponse),
        (status = 404, description = "Book not found", body = MessageResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> AppResult<Json<BookRecord>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create a book, optionally with a cover image
///
/// Accepts a JSON body, or a multipart form holding the same fields as text
/// plus an optional `coverImage` file. A failure while storing the cover does
/// not fail the creation.
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 200, description = "Book created", body = CreatedResponse),
        (status = 400, description = "Invalid input or book refused by the store", body = MessageResponse),
        (status = 500, description = "Unexpected failure", body = MessageResponse)
    )
)]
pub async fn create_book(State(state): State<AppState>, form: BookForm) -> Response {
    match state.services.books.create(form.input, form.cover).await {
        Ok(book) => (
            StatusCode::OK,
            Json(CreatedResponse {
                message: "Book created successfully".to_string(),
                id: book.id.unwrap_or_default(),
            }),
        )
            .into_response(),
        Err(e) if e.is_unexpected() => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.client_message("Error creating book"),
        ),
        Err(e) => reply(StatusCode::BAD_REQUEST, e.client_message("Error creating book")),
    }
}

/// Update a book
///
/// An unexpected failure answers 200 with an error message rather than a 5xx.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated, or unexpected failure", body = MessageResponse),
        (status = 400, description = "Invalid input or book refused by the store", body = MessageResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(input), _): WithRejection<Json<BookInput>, AppError>,
) -> Response {
    match state.services.books.update(&id, input).await {
        Ok(_) => reply(StatusCode::OK, "Book updated successfully"),
        Err(e) if e.is_unexpected() => {
            reply(StatusCode::OK, e.client_message("Error updating book"))
        }
        Err(e) => reply(StatusCode::BAD_REQUEST, e.client_message("Error updating book")),
    }
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 401, description = "Deletion refused", body = MessageResponse),
        (status = 500, description = "Unexpected failure", body = MessageResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> Response {
    match state.services.books.delete(&id).await {
        Ok(()) => reply(StatusCode::OK, "Book deleted successfully"),
        Err(e) if e.is_unexpected() => reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.client_message("Error deleting book"),
        ),
        Err(e) => reply(StatusCode::UNAUTHORIZED, e.client_message("Error deleting book")),
    }
}
