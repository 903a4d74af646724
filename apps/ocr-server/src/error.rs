//! Error types for the OCR server
//!
//! Every failure reaching a handler becomes an [`AppError`], which renders as
//! the failure [`Envelope`]. Client mistakes and fetch problems are 400,
//! exceeded caps 413, anything that broke while processing 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::imaging::ImagingError;
use crate::ocr::OcrError;
use crate::pdf::RasterError;
use crate::response::Envelope;
use crate::source::FetchError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request fields
    #[error("{0}")]
    InvalidInput(String),

    #[error("Error fetching URL: {0}")]
    Fetch(#[from] FetchError),

    /// A configured resource cap was exceeded
    #[error("{0}")]
    LimitExceeded(String),

    /// Rasterization, decoding or recognition failed
    #[error("OCR processing failed: {0}")]
    Processing(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(FetchError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Fetch(_) => StatusCode::BAD_REQUEST,
            AppError::LimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RasterError> for AppError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::TooManyPages { .. } | RasterError::PageTooLarge { .. } => {
                AppError::LimitExceeded(err.to_string())
            }
            other => AppError::Processing(other.to_string()),
        }
    }
}

impl From<ImagingError> for AppError {
    fn from(err: ImagingError) -> Self {
        match err {
            ImagingError::TooLarge { .. } => AppError::LimitExceeded(err.to_string()),
            other => AppError::Processing(other.to_string()),
        }
    }
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        AppError::Processing(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }

        (status, Json(Envelope::failure(self.to_string()))).into_response()
    }
}
