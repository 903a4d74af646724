//! OCR Service
//!
//! Orchestrates rasterization, normalization and recognition for one document.

use std::sync::Arc;

use tracing::instrument;

use super::{
    assemble::{assemble_pages, assemble_single, AssembleOptions},
    language::LanguageResolver,
    provider::Recognizer,
    types::{PageImage, RecognitionResult},
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::imaging::{self, NormalizeOptions};
use crate::pdf::Rasterizer;
use crate::source::SourceDocument;

/// OCR service configuration
#[derive(Debug, Clone)]
pub struct OcrServiceConfig {
    pub languages: LanguageResolver,
    /// Applied to decoded images; PDF pages come back from the rasterizer already normalized
    pub normalize: NormalizeOptions,
    /// Largest width or height accepted when decoding an uploaded image
    pub max_decode_dimension: u32,
    pub assemble: AssembleOptions,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            languages: LanguageResolver::default(),
            normalize: NormalizeOptions::default(),
            max_decode_dimension: 10_000,
            assemble: AssembleOptions::default(),
        }
    }
}

impl From<&Config> for OcrServiceConfig {
    fn from(config: &Config) -> Self {
        Self {
            languages: LanguageResolver::new(
                config.ocr.default_language.clone(),
                config.ocr.auto_languages.clone(),
            ),
            normalize: config.normalize_options(),
            max_decode_dimension: config.limits.max_decode_dimension,
            assemble: AssembleOptions {
                page_markers: config.ocr.page_markers,
                empty_text_message: config.ocr.empty_text_message.clone(),
            },
        }
    }
}

/// OCR service turning source documents into text
pub struct OcrService {
    config: OcrServiceConfig,
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn Recognizer>,
}

impl OcrService {
    pub fn new(
        config: OcrServiceConfig,
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            recognizer,
        }
    }

    /// Name of the recognition backend
    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    pub async fn recognizer_available(&self) -> bool {
        self.recognizer.is_available().await
    }

    /// Extract the text of a document
    ///
    /// Any failing page fails the whole document; partial text is never returned.
    #[instrument(skip_all, fields(name = %document.name, size = document.bytes.len()))]
    pub async fn extract_text(&self, document: SourceDocument, hint: Option<&str>) -> Result<String> {
        let language = self.config.languages.resolve(hint);
        let is_pdf = document.is_pdf();
        tracing::debug!(%language, is_pdf, "Starting OCR");

        let pages = if is_pdf {
            self.rasterizer.rasterize(document.bytes).await?
        } else {
            vec![self.image_page(document.bytes).await?]
        };

        let mut results = Vec::with_capacity(pages.len());
        for page in &pages {
            let text = self.recognizer.recognize(page, &language).await?;
            results.push(RecognitionResult {
                page: page.index,
                text,
            });
        }

        tracing::info!(
            pages = results.len(),
            recognizer = self.recognizer.name(),
            "OCR complete"
        );

        if is_pdf {
            Ok(assemble_pages(&results, &self.config.assemble))
        } else {
            let single = results.pop().ok_or_else(|| {
                AppError::Processing("image produced no page".to_string())
            })?;
            Ok(assemble_single(single, &self.config.assemble))
        }
    }

    async fn image_page(&self, data: Vec<u8>) -> Result<PageImage> {
        let options = self.config.normalize;
        let max_side = self.config.max_decode_dimension;

        let image = tokio::task::spawn_blocking(move || {
            imaging::decode(&data, max_side).map(|image| imaging::normalize(image, &options))
        })
        .await
        .map_err(|e| AppError::Processing(format!("Task join error: {}", e)))??;

        Ok(PageImage::new(0, image))
    }
}
