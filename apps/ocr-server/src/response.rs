//! JSON response envelope shared by every OCR endpoint

use serde::Serialize;

/// `{"success": true, "text": ...}` or `{"success": false, "error": ...}`
///
/// Fields are private so an envelope always carries exactly one of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Envelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            error: Some(message.into()),
        }
    }
}
