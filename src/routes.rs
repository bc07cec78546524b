//! Axum route handlers for the HTTP API.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::WordError;
use crate::model::{
    CsvRow, ErrorResponse, HealthResponse, ListQuery, MessageResponse, SearchQuery, UploadResponse,
    WordPage, WordPayload, WordRecord,
};
use crate::service::parse_csv;
use crate::AppState;

/// Multipart field holding the uploaded CSV.
pub const UPLOAD_FIELD: &str = "file";

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, Response>;

fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, message.into(), None)
}

fn error_response(
    status: StatusCode,
    message: String,
    translations: Option<BTreeMap<String, String>>,
) -> Response {
    let body: ApiError = (
        status,
        Json(ErrorResponse {
            message,
            translations,
        }),
    );
    body.into_response()
}

impl IntoResponse for WordError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            info!("Rejected request: {}", self);
        } else {
            error!("Request failed: {}", self);
        }

        match self {
            WordError::DuplicateLanguage(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string(), None)
            }
            WordError::IncorrectWord { .. } => error_response(
                StatusCode::BAD_REQUEST,
                "One or more words are incorrect".to_string(),
                None,
            ),
            WordError::UnableToTranslate { translations, .. } => error_response(
                StatusCode::BAD_REQUEST,
                "Unable to translate required fields".to_string(),
                Some(translations),
            ),
            WordError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "Word not found".to_string(), None)
            }
            WordError::InvalidCsv(e) => error_response(
                StatusCode::BAD_REQUEST,
                format!("Error processing CSV file: {}", e),
                None,
            ),
            WordError::Storage(_) | WordError::Upload(_) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
        }
    }
}

fn word_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, Response> {
    path.map(|Path(id)| id).map_err(|rejection| {
        warn!("Invalid word id: {}", rejection.body_text());
        bad_request("Invalid word id")
    })
}

fn json_body(body: Result<Json<WordPayload>, JsonRejection>) -> Result<WordPayload, Response> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

/// `GET /health`: service status plus translation gateway counters.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        translator: state.service.translator().metrics(),
    })
}

/// `GET /words?page&limit&sortKey&sortOrder`
pub async fn list_words(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<WordPage> {
    let Query(query) = query.map_err(|rejection| bad_request(rejection.body_text()))?;
    let page = state.service.list(query).await.map_err(IntoResponse::into_response)?;
    Ok(Json(page))
}

/// `POST /words`: complete, validate and store a new record.
pub async fn create_word(
    State(state): State<Arc<AppState>>,
    body: Result<Json<WordPayload>, JsonRejection>,
) -> ApiResult<WordRecord> {
    let payload = json_body(body)?;
    let record = state
        .service
        .create(payload)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(record))
}

/// `GET /words/:id`
pub async fn get_word(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<WordRecord> {
    let id = word_id(path)?;
    let record = state.service.get(id).await.map_err(IntoResponse::into_response)?;
    Ok(Json(record))
}

/// `PUT /words/:id`: same pipeline as create, then overwrite.
pub async fn update_word(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<WordPayload>, JsonRejection>,
) -> ApiResult<WordRecord> {
    let id = word_id(path)?;
    let payload = json_body(body)?;
    let record = state
        .service
        .update(id, payload)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(record))
}

/// `DELETE /words/:id`: succeeds whether or not the id existed.
pub async fn delete_word(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let id = word_id(path)?;
    state
        .service
        .delete(id)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(MessageResponse {
        message: "Word deleted".to_string(),
    }))
}

/// `GET /search?keyword&page&limit`
pub async fn search_words(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<WordPage> {
    let Query(query) = query.map_err(|rejection| bad_request(rejection.body_text()))?;
    let page = state
        .service
        .search(query)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(page))
}

/// `POST /upload-csv`: bulk import from the multipart `file` field.
///
/// The upload is spooled to a temporary file under the upload directory,
/// which is removed when the handler returns on any path.
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut contents = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
            contents = Some(bytes);
            break;
        }
    }

    let Some(contents) = contents else {
        return Err(bad_request("No file uploaded"));
    };

    let upload_dir = state.upload_dir.clone();
    let rows = tokio::task::spawn_blocking(move || read_upload(&upload_dir, &contents))
        .await
        .map_err(|e| WordError::Upload(format!("Upload task failed: {}", e)).into_response())?
        .map_err(IntoResponse::into_response)?;

    let results = state
        .service
        .import_rows(rows)
        .await
        .map_err(IntoResponse::into_response)?;
    info!("Processed CSV upload with {} rows", results.len());

    Ok(Json(UploadResponse {
        message: "CSV file processed successfully".to_string(),
        results,
    }))
}

/// Spool the upload to disk and parse it. Blocking; the spooled file is
/// removed before returning.
fn read_upload(dir: &FsPath, contents: &[u8]) -> Result<Vec<CsvRow>, WordError> {
    let spooled = spool_upload(dir, contents)?;
    let reader = spooled
        .reopen()
        .map_err(|e| WordError::Upload(format!("{}: {}", spooled.path().display(), e)))?;
    parse_csv(reader)
}

fn spool_upload(dir: &FsPath, contents: &[u8]) -> Result<tempfile::NamedTempFile, WordError> {
    let upload_error = |e: std::io::Error| WordError::Upload(format!("{}: {}", dir.display(), e));

    std::fs::create_dir_all(dir).map_err(upload_error)?;
    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".csv")
        .tempfile_in(dir)
        .map_err(upload_error)?;
    file.write_all(contents).map_err(upload_error)?;
    file.flush().map_err(upload_error)?;
    Ok(file)
}
