// gate.rs — The validation pipeline enforcing the English-only policy.
//
// Policy:
//   - compliant content is valid as-is
//   - flagged content with auto_translate: a successful translation makes
//     it valid regardless of strict_mode, and the translation is attached
//   - translation failure (or auto_translate off): strict_mode decides
//     between invalid-with-issue and valid-with-warning

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use gf_translate::{TranslationClient, TranslationRequest, TranslationResponse};
use serde::{Deserialize, Serialize};

use crate::detect::{detect_language, Language};

/// Seam over the translation client so the gate can be driven by a stub.
#[async_trait]
pub trait Translate: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> TranslationResponse;
}

#[async_trait]
impl Translate for TranslationClient {
    async fn translate(&self, request: &TranslationRequest) -> TranslationResponse {
        TranslationClient::translate(self, request).await
    }
}

/// What to validate and how strictly.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub content: String,
    /// Translate flagged content instead of just reporting it.
    pub auto_translate: bool,
    /// When true, unresolved non-English content is invalid; when false
    /// it only warns.
    pub strict_mode: bool,
}

/// Structured validation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub detected_language: Language,
    pub confidence: f32,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_content: Option<String>,
}

/// The compliance gate. Holds the translation client it escalates to.
pub struct LanguageGate {
    translator: Arc<dyn Translate>,
}

impl LanguageGate {
    pub fn new(translator: Arc<dyn Translate>) -> Self {
        Self { translator }
    }

    /// Validate content before it is saved.
    pub async fn validate_before_save(&self, ctx: &ValidationContext) -> ValidationOutcome {
        let detection = detect_language(&ctx.content);
        let mut outcome = ValidationOutcome {
            valid: true,
            detected_language: detection.language,
            confidence: detection.confidence,
            issues: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            translated_content: None,
        };

        if !detection.needs_translation {
            return outcome;
        }

        let flagged = format!(
            "content detected as {} (confidence {:.2}), policy requires English",
            detection.language, detection.confidence
        );

        if ctx.auto_translate {
            let request = TranslationRequest::to_english(
                ctx.content.clone(),
                Some(detection.language.to_string()),
            );
            let response = self.translator.translate(&request).await;

            if response.success {
                // A successful translation resolves the violation outright,
                // strict or not.
                outcome.translated_content = Some(response.translated_text);
                outcome
                    .suggestions
                    .push("replace the content with the attached translation".to_string());
                return outcome;
            }

            let failure = response
                .error
                .unwrap_or_else(|| "translation failed".to_string());
            tracing::warn!("auto-translation failed: {}", failure);
            self.unresolved(&mut outcome, ctx, flagged, Some(failure));
        } else {
            self.unresolved(&mut outcome, ctx, flagged, None);
            outcome
                .suggestions
                .push("re-run with auto-translate enabled".to_string());
        }

        outcome
    }

    /// Validate a file's contents. An unreadable file is an issue, not a panic.
    pub async fn validate_file_content(
        &self,
        path: &Path,
        auto_translate: bool,
        strict_mode: bool,
    ) -> ValidationOutcome {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                self.validate_before_save(&ValidationContext {
                    content,
                    auto_translate,
                    strict_mode,
                })
                .await
            }
            Err(e) => ValidationOutcome {
                valid: false,
                detected_language: Language::Unknown,
                confidence: 0.0,
                issues: vec![format!("cannot read {}: {}", path.display(), e)],
                warnings: Vec::new(),
                suggestions: Vec::new(),
                translated_content: None,
            },
        }
    }

    fn unresolved(
        &self,
        outcome: &mut ValidationOutcome,
        ctx: &ValidationContext,
        flagged: String,
        failure: Option<String>,
    ) {
        let detail = match failure {
            Some(f) => format!("{}; translation unavailable: {}", flagged, f),
            None => flagged,
        };
        if ctx.strict_mode {
            outcome.valid = false;
            outcome.issues.push(detail);
        } else {
            outcome.warnings.push(detail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_translate::TranslationResponse;

    struct StubTranslator {
        succeed: bool,
    }

    #[async_trait]
    impl Translate for StubTranslator {
        async fn translate(&self, request: &TranslationRequest) -> TranslationResponse {
            if self.succeed {
                TranslationResponse {
                    success: true,
                    translated_text: "Hello world".to_string(),
                    confidence: 0.9,
                    provider: None,
                    error: None,
                }
            } else {
                TranslationResponse::unavailable(request.text.clone(), "no provider")
            }
        }
    }

    fn gate(succeed: bool) -> LanguageGate {
        LanguageGate::new(Arc::new(StubTranslator { succeed }))
    }

    fn ctx(content: &str, auto_translate: bool, strict_mode: bool) -> ValidationContext {
        ValidationContext {
            content: content.to_string(),
            auto_translate,
            strict_mode,
        }
    }

    #[tokio::test]
    async fn english_content_is_valid_without_translation() {
        let outcome = gate(true)
            .validate_before_save(&ctx("This is a perfectly fine English sentence", false, true))
            .await;
        assert!(outcome.valid);
        assert_eq!(outcome.detected_language, Language::English);
        assert!(outcome.translated_content.is_none());
        assert!(outcome.issues.is_empty());
    }

    #[tokio::test]
    async fn empty_content_is_compliant() {
        let outcome = gate(false).validate_before_save(&ctx("", true, true)).await;
        assert!(outcome.valid);
        assert!(outcome.issues.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn successful_translation_is_valid_even_in_strict_mode() {
        let outcome = gate(true)
            .validate_before_save(&ctx("Привет мир", true, true))
            .await;
        assert!(outcome.valid);
        assert_eq!(outcome.detected_language, Language::Russian);
        assert_eq!(outcome.translated_content.as_deref(), Some("Hello world"));
        assert!(outcome.issues.is_empty());
        assert!(!outcome.suggestions.is_empty());
    }

    #[tokio::test]
    async fn failed_translation_in_strict_mode_is_invalid() {
        let outcome = gate(false)
            .validate_before_save(&ctx("Привет мир", true, true))
            .await;
        assert!(!outcome.valid);
        assert_eq!(outcome.issues.len(), 1);
        assert!(outcome.issues[0].contains("russian"));
        assert!(outcome.translated_content.is_none());
    }

    #[tokio::test]
    async fn failed_translation_in_lenient_mode_only_warns() {
        let outcome = gate(false)
            .validate_before_save(&ctx("Привет мир", true, false))
            .await;
        assert!(outcome.valid);
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[tokio::test]
    async fn no_auto_translate_strict_flags_issue_with_suggestion() {
        let outcome = gate(true)
            .validate_before_save(&ctx("Привет мир", false, true))
            .await;
        assert!(!outcome.valid);
        assert_eq!(outcome.issues.len(), 1);
        assert!(outcome
            .suggestions
            .iter()
            .any(|s| s.contains("auto-translate")));
    }

    #[tokio::test]
    async fn validate_file_content_reads_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "This is an English note about the fix").unwrap();

        let outcome = gate(false).validate_file_content(&path, false, true).await;
        assert!(outcome.valid);
        assert_eq!(outcome.detected_language, Language::English);
    }

    #[tokio::test]
    async fn unreadable_file_is_an_issue() {
        let outcome = gate(false)
            .validate_file_content(Path::new("/nonexistent/notes.md"), false, false)
            .await;
        assert!(!outcome.valid);
        assert_eq!(outcome.issues.len(), 1);
    }
}
