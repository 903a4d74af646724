//! OCR Providers
//!
//! Defines the recognizer trait and the tesseract CLI implementation.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{OcrError, PageImage};

/// Text recognition backend
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Check if the backend can currently be used
    async fn is_available(&self) -> bool;

    /// Recognize the text on one page. Returns an empty string for blank pages.
    async fn recognize(&self, page: &PageImage, language: &str) -> Result<String, OcrError>;
}

#[derive(Debug, Clone)]
pub struct TesseractOptions {
    /// Path or name of the tesseract executable
    pub binary: String,
    /// `--psm` value; tesseract's automatic segmentation when `None`
    pub psm: Option<u8>,
    pub timeout: Duration,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            psm: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Recognizer shelling out to the `tesseract` CLI
pub struct TesseractRecognizer {
    options: TesseractOptions,
}

impl TesseractRecognizer {
    pub fn new(options: TesseractOptions) -> Self {
        Self { options }
    }

    fn command(&self, input: &std::path::Path, language: &str) -> Command {
        let mut cmd = Command::new(&self.options.binary);
        cmd.arg(input).arg("stdout").arg("-l").arg(language);
        if let Some(psm) = self.options.psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        // A timed out recognition drops the future, which must take the child with it
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.options.binary)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(page = page.index + 1, lang = %language))]
    async fn recognize(&self, page: &PageImage, language: &str) -> Result<String, OcrError> {
        // Removed with everything in it when dropped, on every exit path
        let tmpdir = tempfile::Builder::new()
            .prefix("ocr-page-")
            .tempdir()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create temp dir: {}", e)))?;
        let input_path = tmpdir.path().join("input.png");

        tokio::fs::write(&input_path, page.to_png()?)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let timeout = self.options.timeout;
        let output = tokio::time::timeout(timeout, self.command(&input_path, language).output())
            .await
            .map_err(|_| OcrError::Timeout(timeout.as_secs()))?
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::ProviderNotAvailable(format!(
                    "'{}' not found on PATH",
                    self.options.binary
                )),
                _ => OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(chars = text.len(), "Tesseract finished");

        // Tesseract ends each page with a form feed; the text itself is left alone
        Ok(text.trim_end_matches(['\x0c', '\n', '\r']).to_string())
    }
}
