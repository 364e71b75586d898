// types.rs — Ephemeral request/response value objects. Never persisted.

use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

/// A single translation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// The text to translate.
    pub text: String,
    /// Source language, when known (e.g., "russian").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    /// Target language (e.g., "english").
    pub target_language: String,
}

impl TranslationRequest {
    /// Request translating `text` into English.
    pub fn to_english(text: impl Into<String>, source_language: Option<String>) -> Self {
        Self {
            text: text.into(),
            source_language,
            target_language: "english".to_string(),
        }
    }
}

/// The outcome of a translation attempt.
///
/// On failure `translated_text` carries the original text unchanged and
/// `confidence` is zero, so callers can always use the field directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub success: bool,
    pub translated_text: String,
    pub confidence: f32,
    /// Which provider produced the translation, when one did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationResponse {
    /// Successful translation from the given provider.
    pub fn translated(text: impl Into<String>, provider: ProviderKind, confidence: f32) -> Self {
        Self {
            success: true,
            translated_text: text.into(),
            confidence,
            provider: Some(provider),
            error: None,
        }
    }

    /// Fallback: translation unavailable, original text passed through.
    pub fn unavailable(original: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            translated_text: original.into(),
            confidence: 0.0,
            provider: None,
            error: Some(error.into()),
        }
    }
}
