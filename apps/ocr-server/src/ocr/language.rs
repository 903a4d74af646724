//! Language hint resolution
//!
//! Callers pass loose hints ("auto", "english", "heb", "eng+fra"). Tesseract
//! wants its own codes, so the hint is mapped here. Unknown hints pass through
//! untouched; if tesseract doesn't know them the recognition fails.

/// Hint selecting simultaneous multi-language recognition
pub const AUTO_HINT: &str = "auto";

const FRIENDLY_NAMES: &[(&str, &str)] = &[("english", "eng"), ("hebrew", "heb")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageResolver {
    /// Hint applied when the request has none
    default_hint: String,
    /// Code used for the `auto` hint
    auto_languages: String,
}

impl LanguageResolver {
    pub fn new(default_hint: impl Into<String>, auto_languages: impl Into<String>) -> Self {
        Self {
            default_hint: default_hint.into(),
            auto_languages: auto_languages.into(),
        }
    }

    /// Map an optional request hint to a recognizer language code
    pub fn resolve(&self, hint: Option<&str>) -> String {
        let hint = hint
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(self.default_hint.as_str());

        self.resolve_hint(hint)
    }

    fn resolve_hint(&self, hint: &str) -> String {
        if hint.eq_ignore_ascii_case(AUTO_HINT) {
            return self.auto_languages.clone();
        }

        FRIENDLY_NAMES
            .iter()
            .find(|(name, _)| hint.eq_ignore_ascii_case(name))
            .map(|(_, code)| code.to_string())
            .unwrap_or_else(|| hint.to_string())
    }
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(AUTO_HINT, "eng+heb")
    }
}
