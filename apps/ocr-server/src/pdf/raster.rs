//! MuPDF page rendering

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix};

use crate::imaging::{self, NormalizeOptions};
use crate::ocr::PageImage;

/// PDF points per inch, the unit MuPDF page geometry is expressed in
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Cannot open PDF: {0}")]
    Open(String),

    #[error("PDF is password protected")]
    Encrypted,

    #[error("PDF has {pages} pages, more than the limit of {max}")]
    TooManyPages { pages: usize, max: usize },

    #[error("Page {page} would render at {width}x{height}px, over the {max}px limit")]
    PageTooLarge {
        page: usize,
        width: u64,
        height: u64,
        max: u32,
    },

    #[error("Failed to render page {page}: {reason}")]
    Render { page: usize, reason: String },

    #[error("Rasterizer task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RasterOptions {
    pub dpi: u16,
    pub max_pages: usize,
    /// Largest width or height a page may render at, checked before rendering
    pub max_page_dimension: u32,
    /// Applied to each page as soon as it is rendered
    pub normalize: NormalizeOptions,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_pages: 50,
            max_page_dimension: 10_000,
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Converts PDF bytes into page bitmaps
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Render every page, in document order, normalized and ready for recognition
    async fn rasterize(&self, pdf: Vec<u8>) -> Result<Vec<PageImage>, RasterError>;
}

/// Rasterizer rendering in-memory PDFs through MuPDF
pub struct MuPdfRasterizer {
    options: RasterOptions,
}

impl MuPdfRasterizer {
    pub fn new(options: RasterOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Rasterizer for MuPdfRasterizer {
    async fn rasterize(&self, pdf: Vec<u8>) -> Result<Vec<PageImage>, RasterError> {
        let options = self.options;

        // MuPDF documents are neither Send nor cheap, so the whole render
        // happens on one blocking thread
        tokio::task::spawn_blocking(move || render_all(&pdf, options))
            .await
            .map_err(|e| RasterError::Task(e.to_string()))?
    }
}

fn render_all(pdf: &[u8], options: RasterOptions) -> Result<Vec<PageImage>, RasterError> {
    let doc = Document::from_bytes(pdf, "application/pdf")
        .map_err(|e| RasterError::Open(e.to_string()))?;

    if doc.needs_password().map_err(|e| RasterError::Open(e.to_string()))? {
        return Err(RasterError::Encrypted);
    }

    let page_count = doc
        .page_count()
        .map_err(|e| RasterError::Open(e.to_string()))? as usize;
    if page_count == 0 {
        return Err(RasterError::Open("document has no pages".to_string()));
    }
    if page_count > options.max_pages {
        return Err(RasterError::TooManyPages {
            pages: page_count,
            max: options.max_pages,
        });
    }

    let scale = f32::from(options.dpi) / POINTS_PER_INCH;
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let render_err = |e: mupdf::Error| RasterError::Render {
            page: index + 1,
            reason: e.to_string(),
        };

        let page = doc.load_page(index as i32).map_err(render_err)?;

        let bounds = page.bounds().map_err(render_err)?;
        let width = pixel_extent(bounds.x1 - bounds.x0, scale);
        let height = pixel_extent(bounds.y1 - bounds.y0, scale);
        let max = u64::from(options.max_page_dimension);
        if width > max || height > max {
            return Err(RasterError::PageTooLarge {
                page: index + 1,
                width,
                height,
                max: options.max_page_dimension,
            });
        }

        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, false)
            .map_err(render_err)?;

        let rendered = pixmap_to_image(&pixmap).ok_or_else(|| RasterError::Render {
            page: index + 1,
            reason: "pixmap has an unexpected layout".to_string(),
        })?;
        drop(pixmap);
        let image = imaging::normalize(rendered, &options.normalize);

        tracing::debug!(
            page = index + 1,
            width = image.width(),
            height = image.height(),
            "Rendered PDF page"
        );
        pages.push(PageImage::new(index, image));
    }

    Ok(pages)
}

/// Pixels covered by `points` of page geometry at `scale`
fn pixel_extent(points: f32, scale: f32) -> u64 {
    (f64::from(points.max(0.0)) * f64::from(scale)).ceil() as u64
}

fn pixmap_to_image(pixmap: &mupdf::Pixmap) -> Option<DynamicImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let n = pixmap.n() as usize;
    let samples = pixmap.samples();

    let pixels = (width as usize).checked_mul(height as usize)?;
    if n < 3 || samples.len() < pixels.checked_mul(n)? {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixels.checked_mul(3)?);
    for px in samples.chunks_exact(n).take(pixels) {
        rgb.extend_from_slice(&px[..3]);
    }

    RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ColorMode;
    use image::ColorType;

    fn blank_pdf(pages: usize) -> Vec<u8> {
        sized_pdf(pages, 72, 144)
    }

    /// Build a minimal PDF with `pages` blank pages of `width`x`height` points
    /// and a correct xref table
    fn sized_pdf(pages: usize, width: u32, height: u32) -> Vec<u8> {
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                (0..pages)
                    .map(|i| format!("{} 0 R", i + 3))
                    .collect::<Vec<_>>()
                    .join(" "),
                pages
            ),
        ];
        for _ in 0..pages {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] >>",
                width, height
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        out
    }

    /// Render at `dpi` keeping full size and color
    fn options(dpi: u16, max_pages: usize) -> RasterOptions {
        RasterOptions {
            dpi,
            max_pages,
            max_page_dimension: 10_000,
            normalize: NormalizeOptions {
                max_dimension: None,
                color_mode: ColorMode::Rgb,
            },
        }
    }

    #[tokio::test]
    async fn test_renders_every_page_in_order() {
        let rasterizer = MuPdfRasterizer::new(options(72, 10));
        let pages = rasterizer.rasterize(blank_pdf(3)).await.unwrap();

        assert_eq!(pages.len(), 3);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.index, i);
            assert_eq!((page.image.width(), page.image.height()), (72, 144));
        }
    }

    #[tokio::test]
    async fn test_resolution_scales_output() {
        let rasterizer = MuPdfRasterizer::new(options(144, 10));
        let pages = rasterizer.rasterize(blank_pdf(1)).await.unwrap();
        assert_eq!((pages[0].image.width(), pages[0].image.height()), (144, 288));
    }

    #[tokio::test]
    async fn test_page_limit_rejected_before_rendering() {
        let rasterizer = MuPdfRasterizer::new(options(72, 2));
        let err = rasterizer.rasterize(blank_pdf(3)).await.unwrap_err();
        assert!(matches!(err, RasterError::TooManyPages { pages: 3, max: 2 }));
    }

    #[tokio::test]
    async fn test_garbage_is_an_error() {
        let rasterizer = MuPdfRasterizer::new(RasterOptions::default());
        assert!(rasterizer.rasterize(b"not a pdf at all".to_vec()).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_page_rejected_before_rendering() {
        let rasterizer = MuPdfRasterizer::new(RasterOptions {
            max_page_dimension: 5_000,
            ..options(72, 10)
        });
        let err = rasterizer.rasterize(sized_pdf(1, 7200, 7)).await.unwrap_err();
        assert!(matches!(
            err,
            RasterError::PageTooLarge {
                page: 1,
                width: 7200,
                height: 7,
                max: 5_000
            }
        ));
    }

    #[tokio::test]
    async fn test_dpi_counts_toward_page_limit() {
        // 3000pt fits at 72 dpi but not at 144
        let pdf = sized_pdf(1, 3000, 10);
        let fits = RasterOptions {
            max_page_dimension: 5_000,
            ..options(72, 10)
        };
        assert!(MuPdfRasterizer::new(fits).rasterize(pdf.clone()).await.is_ok());

        let doubled = RasterOptions { dpi: 144, ..fits };
        let err = MuPdfRasterizer::new(doubled).rasterize(pdf).await.unwrap_err();
        assert!(matches!(err, RasterError::PageTooLarge { width: 6000, .. }));
    }

    #[tokio::test]
    async fn test_pages_are_normalized_as_rendered() {
        let rasterizer = MuPdfRasterizer::new(RasterOptions {
            normalize: NormalizeOptions {
                max_dimension: Some(72),
                color_mode: ColorMode::Grayscale,
            },
            ..options(72, 10)
        });
        let pages = rasterizer.rasterize(sized_pdf(2, 72, 144)).await.unwrap();

        for page in &pages {
            assert_eq!((page.image.width(), page.image.height()), (36, 72));
            assert_eq!(page.image.color(), ColorType::L8);
        }
    }
}
