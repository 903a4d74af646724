//! Shared fixtures for the HTTP-level tests

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::header::CONTENT_TYPE, routing::get, Router};
use axum_test::TestServer;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use parking_lot::Mutex;

use ocr_server::ocr::{OcrError, PageImage, Recognizer};
use ocr_server::pdf::{RasterError, Rasterizer};
use ocr_server::source::{FetchLimits, HttpFetcher};
use ocr_server::{AppState, Config};

/// Fake PDF understood by [`FakeRasterizer`]: `%FAKEPDF <pages>`
pub fn fake_pdf(pages: usize) -> Vec<u8> {
    format!("%FAKEPDF {}", pages).into_bytes()
}

/// Rasterizer reading the page count out of [`fake_pdf`] payloads
///
/// Page `i` is rendered `10 * (i + 1)` pixels wide so recognized text can be
/// traced back to its page.
pub struct FakeRasterizer {
    pub max_pages: usize,
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn rasterize(&self, pdf: Vec<u8>) -> Result<Vec<PageImage>, RasterError> {
        let pages: usize = std::str::from_utf8(&pdf)
            .ok()
            .and_then(|s| s.strip_prefix("%FAKEPDF "))
            .and_then(|n| n.trim().parse().ok())
            .ok_or_else(|| RasterError::Open("not a fake pdf".to_string()))?;

        if pages > self.max_pages {
            return Err(RasterError::TooManyPages {
                pages,
                max: self.max_pages,
            });
        }

        Ok((0..pages)
            .map(|i| {
                let width = 10 * (i as u32 + 1);
                PageImage::new(i, DynamicImage::ImageLuma8(GrayImage::new(width, 10)))
            })
            .collect())
    }
}

/// How [`ScriptedRecognizer`] answers
#[derive(Debug, Clone)]
pub enum Script {
    /// Report the page geometry: `"<width>x<height>"`
    Geometry,
    /// Recognize nothing
    Blank,
    /// Fail every page
    Fail(String),
}

/// Deterministic recognizer recording every call
pub struct ScriptedRecognizer {
    script: Script,
    pub calls: Mutex<Vec<(usize, String)>>,
}

impl ScriptedRecognizer {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn languages(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, lang)| lang.clone()).collect()
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        !matches!(self.script, Script::Fail(_))
    }

    async fn recognize(&self, page: &PageImage, language: &str) -> Result<String, OcrError> {
        self.calls.lock().push((page.index, language.to_string()));
        match &self.script {
            Script::Geometry => Ok(format!("{}x{}", page.image.width(), page.image.height())),
            Script::Blank => Ok(String::new()),
            Script::Fail(message) => Err(OcrError::ProcessingError(message.clone())),
        }
    }
}

/// Settings used by every test unless overridden
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.limits.max_pages = 5;
    config.limits.max_upload_bytes = 64 * 1024;
    config.limits.max_download_bytes = 64 * 1024;
    config.limits.fetch_timeout = Duration::from_secs(5);
    config
}

pub fn test_server(config: Config, recognizer: Arc<ScriptedRecognizer>) -> TestServer {
    let fetcher = HttpFetcher::new(FetchLimits {
        max_bytes: config.limits.max_download_bytes,
        timeout: config.limits.fetch_timeout,
    })
    .unwrap();
    let rasterizer = FakeRasterizer {
        max_pages: config.limits.max_pages,
    };

    let state = AppState::new(config, Arc::new(fetcher), Arc::new(rasterizer), recognizer);
    TestServer::new(ocr_server::router(state)).unwrap()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255])));
    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

/// Start a real HTTP server standing in for a remote file host
///
/// Serves `/scan.png` (40x20), `/report.pdf` (3 pages), `/download`
/// (2-page PDF announced only by Content-Type) and `/huge.png` (over the
/// test download limit). Everything else is 404.
pub async fn spawn_file_host() -> String {
    let router = Router::new()
        .route(
            "/scan.png",
            get(|| async { ([(CONTENT_TYPE, "image/png")], png(40, 20)) }),
        )
        .route(
            "/report.pdf",
            get(|| async { ([(CONTENT_TYPE, "application/pdf")], fake_pdf(3)) }),
        )
        .route(
            "/download",
            get(|| async { ([(CONTENT_TYPE, "application/pdf")], fake_pdf(2)) }),
        )
        .route("/huge.png", get(|| async { vec![0u8; 128 * 1024] }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A single multipart part
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn file(file_name: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
        Self {
            name: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

const BOUNDARY: &str = "------------------------ocrserverboundary";

/// Encode parts as `multipart/form-data`, returning the content type and body
pub fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
