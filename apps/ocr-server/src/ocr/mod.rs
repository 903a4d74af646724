//! OCR Module
//!
//! Turns a [`SourceDocument`](crate::source::SourceDocument) into text:
//!
//! 1. classify the payload as PDF or raster image
//! 2. rasterize PDF pages / decode the image
//! 3. normalize each page (downscale, color reduction)
//! 4. recognize each page with the configured [`Recognizer`]
//! 5. assemble the page texts into a single response string
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_server::ocr::{OcrService, OcrServiceConfig, TesseractRecognizer};
//!
//! let service = OcrService::new(OcrServiceConfig::default(), rasterizer, recognizer);
//! let text = service.extract_text(document, Some("english")).await?;
//! ```

mod assemble;
mod language;
mod provider;
mod service;
mod types;

pub use assemble::{assemble_pages, AssembleOptions};
pub use language::{LanguageResolver, AUTO_HINT};
pub use provider::{Recognizer, TesseractOptions, TesseractRecognizer};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{OcrError, PageImage, RecognitionResult};
