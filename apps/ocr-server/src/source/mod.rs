//! Request payload acquisition
//!
//! A request's payload arrives either as a URL we download or as a multipart
//! upload. Both end up as a [`SourceDocument`].

mod fetch;
mod format;

pub use fetch::{FetchError, FetchLimits, HttpFetcher, SourceFetcher};
pub use format::is_pdf;

/// Raw payload of a single request
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub bytes: Vec<u8>,
    /// Uploaded file name, or the path of the URL it was fetched from
    pub name: String,
    /// Content type declared by the uploader or the remote server
    pub content_type: Option<String>,
}

impl SourceDocument {
    pub fn new(bytes: Vec<u8>, name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            name: name.into(),
            content_type,
        }
    }

    pub fn is_pdf(&self) -> bool {
        is_pdf(&self.name, self.content_type.as_deref())
    }
}
