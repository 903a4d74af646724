//! OCR Server Library
//!
//! Accepts an image or PDF by URL or upload and returns the recognized text
//! as JSON. The binary in `main.rs` only wires configuration, logging and the
//! listener around [`routes::router`].
//!
//! # Modules
//!
//! - `source`: payload acquisition and PDF/image classification
//! - `pdf`: page rasterization via MuPDF
//! - `imaging`: bounded decoding and normalization
//! - `ocr`: language hints, recognizers and the pipeline
//! - `routes`: HTTP surface

pub mod config;
pub mod error;
pub mod imaging;
pub mod ocr;
pub mod pdf;
pub mod response;
pub mod routes;
pub mod source;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use response::Envelope;
pub use routes::router;
pub use state::AppState;
