//! OCR routes
//!
//! Endpoints:
//! - POST /ocr - JSON `{ "url": ..., "lang": ... }`, downloads and recognizes the URL
//! - POST /upload_and_ocr - multipart `file` + optional `lang`

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use reqwest::Url;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::response::Envelope;
use crate::source::SourceDocument;
use crate::state::AppState;

/// Room for multipart boundaries and the small text fields next to the file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

const MISSING_URL: &str = "Missing 'url' in JSON body";
const MISSING_FILE: &str = "No file part in the request";
const EMPTY_FILENAME: &str = "No selected file";

/// Create the OCR router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route("/ocr", post(ocr_from_url)).route(
        "/upload_and_ocr",
        post(upload_and_ocr)
            .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))),
    )
}

/// Body of `POST /ocr`
#[derive(Debug, Deserialize)]
pub struct OcrUrlRequest {
    pub url: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

/// POST /ocr
///
/// The body is parsed by hand rather than through `Json` so that a missing or
/// unparseable body gets the same error envelope as a missing field.
async fn ocr_from_url(State(state): State<AppState>, body: Bytes) -> Result<Json<Envelope>> {
    let request: OcrUrlRequest = serde_json::from_slice(&body).map_err(|e| {
        if e.is_syntax() || e.is_eof() {
            AppError::InvalidInput(MISSING_URL.to_string())
        } else {
            AppError::InvalidInput(format!("Invalid JSON body: {}", e))
        }
    })?;

    let raw_url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(MISSING_URL.to_string()))?;
    let url = parse_url(raw_url.trim())?;

    let document = state.fetcher().fetch(&url).await?;
    let text = state
        .ocr()
        .extract_text(document, request.lang.as_deref())
        .await?;

    Ok(Json(Envelope::success(text)))
}

fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| AppError::InvalidInput(format!("Invalid 'url': {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::InvalidInput(format!(
            "Invalid 'url': unsupported scheme '{}'",
            other
        ))),
    }
}

/// POST /upload_and_ocr
async fn upload_and_ocr(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope>> {
    // Not a multipart request at all: there is no file part to find
    let mut multipart = multipart.map_err(|_| AppError::InvalidInput(MISSING_FILE.to_string()))?;
    let max_bytes = state.config().limits.max_upload_bytes;

    let mut document = None;
    let mut saw_unnamed_file = false;
    let mut lang = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if document.is_none() => {
                // Without a filename attribute the part is a plain form value, not a file
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                if file_name.is_empty() {
                    saw_unnamed_file = true;
                    continue;
                }
                let content_type = field.content_type().map(str::to_string);
                let bytes = read_capped(&mut field, max_bytes).await?;

                tracing::debug!(
                    file_name = %file_name,
                    size = bytes.len(),
                    content_type = content_type.as_deref().unwrap_or("-"),
                    "Received upload"
                );
                document = Some(SourceDocument::new(bytes, file_name, content_type));
            }
            Some("lang") => {
                lang = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let document = document.ok_or_else(|| {
        let message = if saw_unnamed_file {
            EMPTY_FILENAME
        } else {
            MISSING_FILE
        };
        AppError::InvalidInput(message.to_string())
    })?;

    let text = state.ocr().extract_text(document, lang.as_deref()).await?;
    Ok(Json(Envelope::success(text)))
}

async fn read_capped(field: &mut Field<'_>, max_bytes: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(upload_too_large(max_bytes));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn upload_too_large(max_bytes: usize) -> AppError {
    AppError::LimitExceeded(format!(
        "Uploaded file exceeds the {} byte upload limit",
        max_bytes
    ))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::LimitExceeded(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Malformed multipart body: {}", err.body_text()))
    }
}
