//! # gf-translate
//!
//! Resilient multi-provider LLM translation client.
//!
//! The one piece of genuine resilience engineering in the workflow:
//! rate-limit-only retry with exponential backoff against the active
//! provider, then a single pass over the alternate providers in fixed
//! priority order. [`TranslationClient::translate`] is total — it always
//! returns a [`TranslationResponse`], never an error, degrading to a
//! zero-confidence passthrough of the original text when every avenue
//! fails.
//!
//! ## Key components
//!
//! - [`ProviderKind`] / [`ProviderConfig`] — named providers
//!   (gemini/openai/anthropic/custom) and their credentials
//! - [`TranslationProvider`] — one-shot provider call, [`HttpProvider`]
//!   implements it over each vendor's chat API
//! - [`RetryConfig`] — backoff policy, overridable via stored config
//! - [`TranslationClient`] — retry + fallback orchestration

pub mod client;
pub mod error;
pub mod http;
pub mod provider;
pub mod types;

pub use client::{RetryConfig, TranslationClient, TranslationSettings};
pub use error::ProviderError;
pub use http::HttpProvider;
pub use provider::{ProviderConfig, ProviderKind, TranslationProvider, FALLBACK_PRIORITY};
pub use types::{TranslationRequest, TranslationResponse};
