// http.rs — HttpProvider: TranslationProvider over each vendor's chat API.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::provider::{ProviderConfig, ProviderKind, TranslationProvider};
use crate::types::TranslationRequest;

const OPENAI_BASE: &str = "https://api.openai.com/v1";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const ANTHROPIC_BASE: &str = "https://api.anthropic.com/v1";

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// HTTP-backed provider for one configured backend.
pub struct HttpProvider {
    kind: ProviderKind,
    config: ProviderConfig,
    http: reqwest::Client,
}

impl HttpProvider {
    pub fn new(kind: ProviderKind, config: ProviderConfig) -> Self {
        Self {
            kind,
            config,
            http: reqwest::Client::new(),
        }
    }

    fn prompt(request: &TranslationRequest) -> String {
        let source = request
            .source_language
            .as_deref()
            .map(|s| format!(" from {}", s))
            .unwrap_or_default();
        format!(
            "Translate the following text{} to {}. \
             Reply with only the translated text, nothing else.\n\n{}",
            source, request.target_language, request.text
        )
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Value,
    ) -> Result<Value, ProviderError> {
        let mut req = self.http.post(url).json(&body);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn call_openai_compatible(
        &self,
        base: &str,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let model = self.config.model.as_deref().unwrap_or(OPENAI_DEFAULT_MODEL);
        let auth = format!("Bearer {}", self.config.api_key);
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": Self::prompt(request)}],
            "temperature": 0.2,
        });

        let payload = self
            .post_json(
                &format!("{}/chat/completions", base),
                &[("Authorization", auth.as_str())],
                body,
            )
            .await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("no choices in response".to_string()))
    }

    async fn call_gemini(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let base = self.config.base_url.as_deref().unwrap_or(GEMINI_BASE);
        let model = self.config.model.as_deref().unwrap_or(GEMINI_DEFAULT_MODEL);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            base, model, self.config.api_key
        );
        let body = json!({
            "contents": [{"parts": [{"text": Self::prompt(request)}]}]
        });

        let payload = self.post_json(&url, &[], body).await?;

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("no candidates in response".to_string()))
    }

    async fn call_anthropic(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let base = self.config.base_url.as_deref().unwrap_or(ANTHROPIC_BASE);
        let model = self
            .config
            .model
            .as_deref()
            .unwrap_or(ANTHROPIC_DEFAULT_MODEL);
        let body = json!({
            "model": model,
            "max_tokens": 4096,
            "messages": [{"role": "user", "content": Self::prompt(request)}],
        });

        let payload = self
            .post_json(
                &format!("{}/messages", base),
                &[
                    ("x-api-key", self.config.api_key.as_str()),
                    ("anthropic-version", "2023-06-01"),
                ],
                body,
            )
            .await?;

        payload["content"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("no content in response".to_string()))
    }
}

#[async_trait]
impl TranslationProvider for HttpProvider {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        tracing::debug!(provider = %self.kind, "translation call");
        match self.kind {
            ProviderKind::OpenAi => {
                let base = self.config.base_url.as_deref().unwrap_or(OPENAI_BASE);
                self.call_openai_compatible(base, request).await
            }
            // "custom" is any OpenAI-compatible endpoint; base_url is required
            // in practice but defaults keep the call well-formed.
            ProviderKind::Custom => {
                let base = self.config.base_url.as_deref().unwrap_or(OPENAI_BASE);
                self.call_openai_compatible(base, request).await
            }
            ProviderKind::Gemini => self.call_gemini(request).await,
            ProviderKind::Anthropic => self.call_anthropic(request).await,
        }
    }
}
