//! PDF vs. raster image classification
//!
//! Classification uses only the declared name and content type. Payload bytes
//! are never sniffed, so a mislabeled file fails later at decode time.

const PDF_MIME: &str = "application/pdf";

/// Whether a payload should be rasterized as a PDF rather than decoded as an image
///
/// `name` is taken literally; callers holding a URL pass its path.
pub fn is_pdf(name: &str, content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains(PDF_MIME)) {
        return true;
    }

    mime_guess::from_path(name)
        .iter()
        .any(|mime| mime.essence_str() == PDF_MIME)
}
