// error.rs — Provider error taxonomy with rate-limit classification.
//
// The retry loop keys off `is_rate_limit()`: only rate-limiting failures
// are worth waiting out, everything else abandons the provider at once.

use thiserror::Error;

/// A single provider call failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the call for rate-limiting reasons.
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// The provider answered with a non-success status.
    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The HTTP request itself failed.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered 2xx but the payload wasn't usable.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Classify this failure as rate-limiting: HTTP 429, or a message
    /// mentioning "rate limit" / "quota exceeded" / "too many requests".
    pub fn is_rate_limit(&self) -> bool {
        match self {
            ProviderError::RateLimited(_) => true,
            ProviderError::Api { status, message } => {
                *status == 429 || is_rate_limit_message(message)
            }
            ProviderError::Request(e) => {
                e.status().is_some_and(|s| s.as_u16() == 429)
            }
            ProviderError::Malformed(_) => false,
        }
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    let message = message.to_lowercase();
    ["rate limit", "quota exceeded", "too many requests"]
        .iter()
        .any(|phrase| message.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_is_rate_limit() {
        let err = ProviderError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        assert!(err.is_rate_limit());
    }

    #[test]
    fn rate_limit_phrases_are_recognized() {
        for message in [
            "Rate limit exceeded for model",
            "your QUOTA EXCEEDED, try later",
            "Too Many Requests",
        ] {
            let err = ProviderError::Api {
                status: 400,
                message: message.to_string(),
            };
            assert!(err.is_rate_limit(), "not classified: {message}");
        }
    }

    #[test]
    fn ordinary_errors_are_not_rate_limits() {
        let err = ProviderError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert!(!err.is_rate_limit());

        let err = ProviderError::Malformed("no choices in response".to_string());
        assert!(!err.is_rate_limit());
    }
}
