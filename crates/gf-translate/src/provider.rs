// provider.rs — Named providers and the one-shot provider contract.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::types::TranslationRequest;

/// The named LLM backends the client can translate through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
    Custom,
}

/// Fallback priority once the active provider is exhausted.
///
/// Deliberately explicit data, not map iteration order: the ordering is
/// part of the client's observable behavior. The exhausted primary and
/// any unconfigured kinds are skipped at use.
pub const FALLBACK_PRIORITY: [ProviderKind; 3] =
    [ProviderKind::Gemini, ProviderKind::OpenAi, ProviderKind::Anthropic];

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "custom" => Ok(ProviderKind::Custom),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Credentials and endpoint overrides for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// One-shot translation call against a single provider.
///
/// Retry and fallback policy live in the client, not here.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate the request, returning the translated text.
    async fn translate(&self, request: &TranslationRequest) -> Result<String, ProviderError>;
}
