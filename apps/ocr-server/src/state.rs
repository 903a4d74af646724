//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrService, OcrServiceConfig, Recognizer, TesseractOptions, TesseractRecognizer};
use crate::pdf::{MuPdfRasterizer, RasterOptions, Rasterizer};
use crate::source::{FetchError, FetchLimits, HttpFetcher, SourceFetcher};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[from] FetchError),
}

/// Shared application state
///
/// Built once at start-up; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    fetcher: Arc<dyn SourceFetcher>,
    ocr: OcrService,
}

impl AppState {
    /// Create application state from explicit collaborators
    pub fn new(
        config: Config,
        fetcher: Arc<dyn SourceFetcher>,
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn Recognizer>,
    ) -> Self {
        let ocr = OcrService::new(OcrServiceConfig::from(&config), rasterizer, recognizer);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                fetcher,
                ocr,
            }),
        }
    }

    /// Create application state with the production collaborators:
    /// `reqwest` for downloads, MuPDF for PDFs and the tesseract CLI
    pub fn from_config(config: Config) -> Result<Self, StateError> {
        let fetcher = HttpFetcher::new(FetchLimits {
            max_bytes: config.limits.max_download_bytes,
            timeout: config.limits.fetch_timeout,
        })?;

        let rasterizer = MuPdfRasterizer::new(RasterOptions {
            dpi: config.ocr.pdf_dpi,
            max_pages: config.limits.max_pages,
            max_page_dimension: config.limits.max_decode_dimension,
            normalize: config.normalize_options(),
        });

        let recognizer = TesseractRecognizer::new(TesseractOptions {
            binary: config.ocr.tesseract_bin.clone(),
            psm: config.ocr.tesseract_psm,
            timeout: config.ocr.recognize_timeout,
        });

        Ok(Self::new(
            config,
            Arc::new(fetcher),
            Arc::new(rasterizer),
            Arc::new(recognizer),
        ))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the URL fetcher
    pub fn fetcher(&self) -> &dyn SourceFetcher {
        self.inner.fetcher.as_ref()
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }
}
