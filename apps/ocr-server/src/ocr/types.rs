//! OCR Types

use std::io::Cursor;

use image::DynamicImage;

/// One bitmap to recognize: a decoded image or a rendered PDF page
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Position in the source document (0-indexed)
    pub index: usize,
    pub image: DynamicImage,
}

impl PageImage {
    pub fn new(index: usize, image: DynamicImage) -> Self {
        Self { index, image }
    }

    /// Encode as PNG for handing to an external recognizer
    pub fn to_png(&self) -> Result<Vec<u8>, OcrError> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .map_err(|e| OcrError::ImageEncoding(e.to_string()))?;
        Ok(buffer)
    }
}

/// Text recognized on a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub page: usize,
    /// Recognized text, empty when the page has none
    pub text: String,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Failed to encode page image: {0}")]
    ImageEncoding(String),

    #[error("{0}")]
    ProcessingError(String),

    #[error("Recognition timed out after {0} seconds")]
    Timeout(u64),
}
