// client.rs — TranslationClient: retry + fallback orchestration.
//
// Policy, reproduced exactly:
//   1. No active provider → zero-confidence passthrough, never an error.
//   2. Active provider: up to max_retries attempts, retrying only on
//      rate-limit classification; other errors abandon it immediately.
//      After failed attempt n (0-indexed) the loop sleeps
//      retry_delay_ms * backoff_multiplier^n (cooperative tokio sleep).
//   3. Alternates in FALLBACK_PRIORITY order, one attempt each.
//   4. Everything failed → same passthrough shape as (1).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gf_goal::GoalStore;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::HttpProvider;
use crate::provider::{ProviderConfig, ProviderKind, TranslationProvider, FALLBACK_PRIORITY};
use crate::types::{TranslationRequest, TranslationResponse};

/// Confidence reported for a translation a provider actually produced.
const TRANSLATED_CONFIDENCE: f32 = 0.9;

/// Backoff policy for rate-limited providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Delay before giving attempt `n` (0-indexed) another try.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let millis = self.retry_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64)
    }

    /// Load overrides from the stored configuration, falling back to the
    /// defaults field by field. This is the only place the dotted string
    /// keys are interpreted — everything else consumes the typed struct.
    pub fn load(store: &dyn GoalStore) -> Self {
        let mut config = Self::default();
        if let Ok(Some(v)) = store.get_config("translation.max_retries") {
            match v.parse() {
                Ok(n) => config.max_retries = n,
                Err(_) => tracing::warn!(value = %v, "ignoring bad translation.max_retries"),
            }
        }
        if let Ok(Some(v)) = store.get_config("translation.retry_delay_ms") {
            match v.parse() {
                Ok(n) => config.retry_delay_ms = n,
                Err(_) => tracing::warn!(value = %v, "ignoring bad translation.retry_delay_ms"),
            }
        }
        if let Ok(Some(v)) = store.get_config("translation.backoff_multiplier") {
            match v.parse() {
                Ok(n) => config.backoff_multiplier = n,
                Err(_) => tracing::warn!(value = %v, "ignoring bad translation.backoff_multiplier"),
            }
        }
        config
    }
}

/// Declarative provider setup, deserialized from the workflow config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationSettings {
    /// The active (primary) provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Credentials per configured provider.
    #[serde(default)]
    pub providers: HashMap<ProviderKind, ProviderConfig>,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Multi-provider translation client. See the module docs for the policy.
pub struct TranslationClient {
    active: Option<ProviderKind>,
    providers: HashMap<ProviderKind, Arc<dyn TranslationProvider>>,
    retry: RetryConfig,
}

impl TranslationClient {
    /// Client with no providers configured. `translate` degrades to the
    /// passthrough fallback.
    pub fn unconfigured() -> Self {
        Self {
            active: None,
            providers: HashMap::new(),
            retry: RetryConfig::default(),
        }
    }

    /// Build HTTP providers from declarative settings.
    pub fn from_settings(settings: TranslationSettings) -> Self {
        let providers = settings
            .providers
            .into_iter()
            .map(|(kind, config)| {
                let provider: Arc<dyn TranslationProvider> =
                    Arc::new(HttpProvider::new(kind, config));
                (kind, provider)
            })
            .collect();
        Self {
            active: settings.provider,
            providers,
            retry: settings.retry,
        }
    }

    /// Register a provider implementation (tests and embedders).
    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn TranslationProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Set the active provider.
    pub fn with_active(mut self, kind: ProviderKind) -> Self {
        self.active = Some(kind);
        self
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Translate. Total: always returns a response, never an error.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationResponse {
        let primary = match self.active.filter(|k| self.providers.contains_key(k)) {
            Some(kind) => kind,
            None => {
                return TranslationResponse::unavailable(
                    request.text.clone(),
                    "no translation provider configured",
                );
            }
        };

        let primary_err = match self.translate_with_retry(primary, request).await {
            Ok(text) => {
                return TranslationResponse::translated(text, primary, TRANSLATED_CONFIDENCE)
            }
            Err(e) => e,
        };
        tracing::warn!(provider = %primary, "primary provider exhausted: {}", primary_err);

        // One attempt per configured alternate, in fixed priority order.
        for kind in FALLBACK_PRIORITY {
            if kind == primary {
                continue;
            }
            let Some(provider) = self.providers.get(&kind) else {
                continue;
            };
            match provider.translate(request).await {
                Ok(text) => {
                    tracing::info!(provider = %kind, "fallback provider succeeded");
                    return TranslationResponse::translated(text, kind, TRANSLATED_CONFIDENCE);
                }
                Err(e) => tracing::warn!(provider = %kind, "fallback provider failed: {}", e),
            }
        }

        TranslationResponse::unavailable(
            request.text.clone(),
            format!(
                "all translation providers failed (primary {}: {})",
                primary, primary_err
            ),
        )
    }

    /// Call one provider with rate-limit-only retry.
    async fn translate_with_retry(
        &self,
        kind: ProviderKind,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let provider = &self.providers[&kind];
        let attempts = self.retry.max_retries.max(1);
        let mut last_err = None;

        for attempt in 0..attempts {
            match provider.translate(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_rate_limit() => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        provider = %kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    last_err = Some(e);
                }
                // Anything that isn't rate limiting won't get better by
                // waiting; abandon this provider immediately.
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ProviderError::Malformed("retry loop finished without an error".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records each call's provider kind and elapsed paused-clock time.
    #[derive(Clone)]
    struct CallLog {
        start: Instant,
        calls: Arc<Mutex<Vec<(ProviderKind, Duration)>>>,
    }

    impl CallLog {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn record(&self, kind: ProviderKind) {
            self.calls
                .lock()
                .unwrap()
                .push((kind, self.start.elapsed()));
        }

        fn calls(&self) -> Vec<(ProviderKind, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    enum Behavior {
        Succeed(&'static str),
        RateLimit,
        HardFail,
    }

    struct MockProvider {
        kind: ProviderKind,
        behavior: Behavior,
        log: CallLog,
    }

    #[async_trait::async_trait]
    impl TranslationProvider for MockProvider {
        async fn translate(&self, _request: &TranslationRequest) -> Result<String, ProviderError> {
            self.log.record(self.kind);
            match self.behavior {
                Behavior::Succeed(text) => Ok(text.to_string()),
                Behavior::RateLimit => Err(ProviderError::Api {
                    status: 429,
                    message: "rate limit exceeded".to_string(),
                }),
                Behavior::HardFail => Err(ProviderError::Api {
                    status: 401,
                    message: "invalid api key".to_string(),
                }),
            }
        }
    }

    fn mock(kind: ProviderKind, behavior: Behavior, log: &CallLog) -> Arc<dyn TranslationProvider> {
        Arc::new(MockProvider {
            kind,
            behavior,
            log: log.clone(),
        })
    }

    fn request() -> TranslationRequest {
        TranslationRequest::to_english("Привет мир", Some("russian".to_string()))
    }

    #[tokio::test]
    async fn no_provider_returns_passthrough_fallback() {
        let client = TranslationClient::unconfigured();
        let response = client.translate(&request()).await;

        assert!(!response.success);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.translated_text, "Привет мир");
        assert!(response.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_skips_retry_and_fallback() {
        let log = CallLog::new();
        let client = TranslationClient::unconfigured()
            .with_provider(
                ProviderKind::OpenAi,
                mock(ProviderKind::OpenAi, Behavior::Succeed("Hello world"), &log),
            )
            .with_provider(
                ProviderKind::Gemini,
                mock(ProviderKind::Gemini, Behavior::Succeed("unused"), &log),
            )
            .with_active(ProviderKind::OpenAi);

        let response = client.translate(&request()).await;
        assert!(response.success);
        assert_eq!(response.translated_text, "Hello world");
        assert_eq!(response.provider, Some(ProviderKind::OpenAi));

        let calls = log.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_backs_off_1000_then_2000_then_falls_back() {
        let log = CallLog::new();
        let client = TranslationClient::unconfigured()
            .with_provider(
                ProviderKind::OpenAi,
                mock(ProviderKind::OpenAi, Behavior::RateLimit, &log),
            )
            .with_provider(
                ProviderKind::Gemini,
                mock(ProviderKind::Gemini, Behavior::Succeed("Hello"), &log),
            )
            .with_provider(
                ProviderKind::Anthropic,
                mock(ProviderKind::Anthropic, Behavior::Succeed("unused"), &log),
            )
            .with_active(ProviderKind::OpenAi)
            .with_retry(RetryConfig {
                max_retries: 2,
                retry_delay_ms: 1000,
                backoff_multiplier: 2.0,
            });

        let response = client.translate(&request()).await;
        assert!(response.success);
        assert_eq!(response.provider, Some(ProviderKind::Gemini));

        // Primary at t=0 and t=1000 (after the first 1000ms backoff), then
        // the second backoff of 2000ms, then the first alternate at t=3000.
        // Anthropic is never reached.
        let calls = log.calls();
        assert_eq!(
            calls,
            vec![
                (ProviderKind::OpenAi, Duration::from_millis(0)),
                (ProviderKind::OpenAi, Duration::from_millis(1000)),
                (ProviderKind::Gemini, Duration::from_millis(3000)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_primary_tries_each_alternate_once_in_priority_order() {
        let log = CallLog::new();
        let client = TranslationClient::unconfigured()
            .with_provider(
                ProviderKind::Gemini,
                mock(ProviderKind::Gemini, Behavior::RateLimit, &log),
            )
            .with_provider(
                ProviderKind::OpenAi,
                mock(ProviderKind::OpenAi, Behavior::RateLimit, &log),
            )
            .with_provider(
                ProviderKind::Anthropic,
                mock(ProviderKind::Anthropic, Behavior::RateLimit, &log),
            )
            .with_active(ProviderKind::Gemini)
            .with_retry(RetryConfig {
                max_retries: 1,
                retry_delay_ms: 500,
                backoff_multiplier: 2.0,
            });

        let response = client.translate(&request()).await;
        assert!(!response.success);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.translated_text, "Привет мир");

        let kinds: Vec<ProviderKind> = log.calls().into_iter().map(|(k, _)| k).collect();
        // Primary once (one attempt), then openai and anthropic once each,
        // skipping the exhausted gemini in the priority list.
        assert_eq!(
            kinds,
            vec![ProviderKind::Gemini, ProviderKind::OpenAi, ProviderKind::Anthropic]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn non_rate_limit_error_aborts_retry_immediately() {
        let log = CallLog::new();
        let client = TranslationClient::unconfigured()
            .with_provider(
                ProviderKind::OpenAi,
                mock(ProviderKind::OpenAi, Behavior::HardFail, &log),
            )
            .with_provider(
                ProviderKind::Gemini,
                mock(ProviderKind::Gemini, Behavior::Succeed("Hello"), &log),
            )
            .with_active(ProviderKind::OpenAi)
            .with_retry(RetryConfig {
                max_retries: 3,
                retry_delay_ms: 1000,
                backoff_multiplier: 2.0,
            });

        let response = client.translate(&request()).await;
        assert!(response.success);
        assert_eq!(response.provider, Some(ProviderKind::Gemini));

        let calls = log.calls();
        // One primary call, no backoff sleeps, straight to the alternate.
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (ProviderKind::OpenAi, Duration::ZERO));
        assert_eq!(calls[1], (ProviderKind::Gemini, Duration::ZERO));
    }

    #[tokio::test]
    async fn active_without_matching_config_degrades_to_fallback_response() {
        let client = TranslationClient::unconfigured().with_active(ProviderKind::Gemini);
        let response = client.translate(&request()).await;
        assert!(!response.success);
        assert_eq!(response.translated_text, "Привет мир");
    }

    #[test]
    fn delay_formula_is_exponential() {
        let retry = RetryConfig {
            max_retries: 3,
            retry_delay_ms: 250,
            backoff_multiplier: 3.0,
        };
        assert_eq!(retry.delay_for(0), Duration::from_millis(250));
        assert_eq!(retry.delay_for(1), Duration::from_millis(750));
        assert_eq!(retry.delay_for(2), Duration::from_millis(2250));
    }

    #[test]
    fn retry_config_loads_overrides_from_store() {
        use gf_goal::{GoalStore, JsonGoalStore};
        let dir = tempfile::tempdir().unwrap();
        let store = JsonGoalStore::new(dir.path().join("goals")).unwrap();

        // Defaults when nothing is stored.
        let config = RetryConfig::load(&store);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1000);

        store.set_config("translation.max_retries", "5").unwrap();
        store.set_config("translation.retry_delay_ms", "200").unwrap();
        store.set_config("translation.backoff_multiplier", "nope").unwrap();

        let config = RetryConfig::load(&store);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay_ms, 200);
        // Bad value falls back to the default.
        assert_eq!(config.backoff_multiplier, 2.0);
    }
}
