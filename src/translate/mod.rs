// Best-effort translation
//
// Providers implement one capability (`TranslationProvider`); the chain tries
// them in a fixed priority order with a bounded timeout per attempt and falls
// back to the untranslated input when none succeeds.

pub mod chain;
pub mod libre;
pub mod lingva;
pub mod mymemory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use chain::*;
pub use libre::LibreTranslateProvider;
pub use lingva::LingvaProvider;
pub use mymemory::MyMemoryProvider;

/// Language codes every provider is known to accept
pub const SUPPORTED_LANGUAGES: [&str; 12] = ["en", "es", "fr", "de", "hi", "zh", "ja", "ko", "pt", "ru", "ar", "it"];

/// Failure of a single provider attempt. Never escapes the chain.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("no translation in response")]
    EmptyResponse,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// One translation backend
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Name used in logs and in `TranslationOutcome::provider`
    fn name(&self) -> &str;

    /// Input cap in characters, applied before this provider is called
    fn max_chars(&self) -> Option<usize> {
        None
    }

    /// Attempt a translation; `source` and `target` are normalized codes
    async fn translate(&self, text: &str, source: &str, target: &str) -> std::result::Result<String, ProviderError>;
}

/// Result of running the chain. `translated` is false whenever `text` is the
/// caller's input returned unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub text: String,
    pub translated: bool,
    pub provider: Option<String>,
}

impl TranslationOutcome {
    pub fn untranslated<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            translated: false,
            provider: None,
        }
    }
}

/// Normalize a language code for the providers.
///
/// Codes are only trimmed and lowercased. Region and script subtags are
/// kept, so `pt-BR` reaches the providers as `pt-br`.
pub fn normalize_lang_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Whether `code` is one of the languages every provider accepts
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Cut `text` to at most `limit` characters on a char boundary
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lang_code() {
        assert_eq!(normalize_lang_code("en"), "en");
        assert_eq!(normalize_lang_code(" ES "), "es");
        assert_eq!(normalize_lang_code("pt-BR"), "pt-br");
        assert_eq!(normalize_lang_code("zh_TW"), "zh_tw");
        assert_eq!(normalize_lang_code("nl"), "nl");
        assert_eq!(normalize_lang_code("sr-Latn"), "sr-latn");
    }

    #[test]
    fn test_supported_language() {
        assert!(is_supported_language("zh"));
        assert!(!is_supported_language("zh-tw"));
        assert!(!is_supported_language("nl"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("", 0), "");
    }
}
