//! Configuration management for the OCR server
//!
//! Every setting has a default; the environment only overrides. A value that
//! is present but malformed is an error rather than a silent fallback.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::imaging::{ColorMode, NormalizeOptions};

/// Configuration errors raised while reading the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub image: ImageConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Recognition and response settings
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Hint used when a request carries no `lang`
    pub default_language: String,
    /// Languages tried together for the `auto` hint, tesseract `+` syntax
    pub auto_languages: String,
    /// Prefix each PDF page with a `--- Page N ---` header
    pub page_markers: bool,
    /// Text returned instead of an empty string when nothing was recognized
    pub empty_text_message: Option<String>,
    pub tesseract_bin: String,
    /// Page segmentation mode; tesseract's automatic mode when unset
    pub tesseract_psm: Option<u8>,
    pub recognize_timeout: Duration,
    /// Rasterization resolution for PDF pages
    pub pdf_dpi: u16,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Longest allowed side before downscaling, 0 disables
    pub max_dimension: u32,
    pub color_mode: ColorMode,
}

/// Caps on everything a request can make us hold in memory
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_download_bytes: usize,
    pub max_upload_bytes: usize,
    pub max_pages: usize,
    /// Largest width or height accepted when decoding an image
    pub max_decode_dimension: u32,
    pub fetch_timeout: Duration,
}

const DEFAULT_MAX_BYTES: usize = 32 * 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            ocr: OcrConfig {
                default_language: "auto".to_string(),
                auto_languages: "eng+heb".to_string(),
                page_markers: true,
                empty_text_message: None,
                tesseract_bin: "tesseract".to_string(),
                tesseract_psm: None,
                recognize_timeout: Duration::from_secs(120),
                pdf_dpi: 200,
            },
            image: ImageConfig {
                max_dimension: 1500,
                color_mode: ColorMode::Grayscale,
            },
            limits: LimitsConfig {
                max_download_bytes: DEFAULT_MAX_BYTES,
                max_upload_bytes: DEFAULT_MAX_BYTES,
                max_pages: 50,
                max_decode_dimension: 10_000,
                fetch_timeout: Duration::from_secs(30),
            },
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            server: ServerConfig {
                host: get("HOST").unwrap_or(defaults.server.host),
                port: parse_or(&get, "PORT", defaults.server.port)?,
            },
            ocr: OcrConfig {
                default_language: get("OCR_DEFAULT_LANG").unwrap_or(defaults.ocr.default_language),
                auto_languages: get("OCR_AUTO_LANGS").unwrap_or(defaults.ocr.auto_languages),
                page_markers: parse_bool_or(&get, "OCR_PAGE_MARKERS", defaults.ocr.page_markers)?,
                empty_text_message: get("OCR_EMPTY_TEXT_MESSAGE"),
                tesseract_bin: get("OCR_TESSERACT_BIN").unwrap_or(defaults.ocr.tesseract_bin),
                tesseract_psm: get("OCR_TESSERACT_PSM")
                    .map(|v| parse_value("OCR_TESSERACT_PSM", v))
                    .transpose()?,
                recognize_timeout: Duration::from_secs(parse_or(
                    &get,
                    "OCR_RECOGNIZE_TIMEOUT_SECS",
                    defaults.ocr.recognize_timeout.as_secs(),
                )?),
                pdf_dpi: parse_or(&get, "OCR_PDF_DPI", defaults.ocr.pdf_dpi)?,
            },
            image: ImageConfig {
                max_dimension: parse_or(&get, "OCR_MAX_DIMENSION", defaults.image.max_dimension)?,
                color_mode: parse_or(&get, "OCR_COLOR_MODE", defaults.image.color_mode)?,
            },
            limits: LimitsConfig {
                max_download_bytes: parse_or(
                    &get,
                    "OCR_MAX_DOWNLOAD_BYTES",
                    defaults.limits.max_download_bytes,
                )?,
                max_upload_bytes: parse_or(
                    &get,
                    "OCR_MAX_UPLOAD_BYTES",
                    defaults.limits.max_upload_bytes,
                )?,
                max_pages: parse_or(&get, "OCR_MAX_PAGES", defaults.limits.max_pages)?,
                max_decode_dimension: parse_or(
                    &get,
                    "OCR_MAX_DECODE_DIMENSION",
                    defaults.limits.max_decode_dimension,
                )?,
                fetch_timeout: Duration::from_secs(parse_or(
                    &get,
                    "OCR_FETCH_TIMEOUT_SECS",
                    defaults.limits.fetch_timeout.as_secs(),
                )?),
            },
        })
    }

    /// Normalizer settings derived from the image and decode limits
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            max_dimension: (self.image.max_dimension > 0).then_some(self.image.max_dimension),
            color_mode: self.image.color_mode,
        }
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value,
    })
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => parse_value(key, value),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(value) = get(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}
