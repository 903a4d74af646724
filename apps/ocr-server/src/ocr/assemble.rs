//! Joining per-page results into the response text

use super::types::RecognitionResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Prefix each page with `--- Page N ---`; otherwise pages are newline-terminated
    pub page_markers: bool,
    /// Returned in place of an empty result
    pub empty_text_message: Option<String>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            page_markers: true,
            empty_text_message: None,
        }
    }
}

/// Build the text of a multi-page document
///
/// `results` must already be in page order.
pub fn assemble_pages(results: &[RecognitionResult], options: &AssembleOptions) -> String {
    if results.iter().all(|r| r.text.trim().is_empty()) {
        return empty_text(options);
    }

    if options.page_markers {
        results
            .iter()
            .map(|r| format!("--- Page {} ---\n{}", r.page + 1, r.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    } else {
        results.iter().fold(String::new(), |mut acc, r| {
            acc.push_str(&r.text);
            acc.push('\n');
            acc
        })
    }
}

/// Build the text of a single image
pub(crate) fn assemble_single(result: RecognitionResult, options: &AssembleOptions) -> String {
    if result.text.trim().is_empty() {
        empty_text(options)
    } else {
        result.text
    }
}

fn empty_text(options: &AssembleOptions) -> String {
    options.empty_text_message.clone().unwrap_or_default()
}
