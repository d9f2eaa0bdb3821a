//! Failure causes for summary generation.

use thiserror::Error;

/// Every way a summary request can fail.
///
/// All messages start with `Error` so they read the same way once they reach
/// the HTTP `detail` field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// No API credential configured; no request was sent.
    #[error("Error: PERPLEXITY_API_KEY not set in environment variables")]
    MissingApiKey,

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("Error from Perplexity API: {0}")]
    Transport(String),

    /// The API answered with a non-200 status.
    #[error("Error from Perplexity API: {message}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Value of the `error` field, or `Unknown error`.
        message: String,
    },

    /// The response body was not JSON.
    #[error("Error: Invalid JSON response from Perplexity API")]
    MalformedBody,

    /// A 200 response without a string `summary` field.
    #[error("Error: Perplexity API response missing summary field")]
    MissingSummary,

    /// Anything not covered above.
    #[error("Error: Unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for SummaryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            Self::Transport(err.to_string())
        } else if err.is_decode() {
            Self::MalformedBody
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message_is_exact() {
        assert_eq!(
            SummaryError::MissingApiKey.to_string(),
            "Error: PERPLEXITY_API_KEY not set in environment variables"
        );
    }

    #[test]
    fn test_every_variant_starts_with_error() {
        let all = [
            SummaryError::MissingApiKey,
            SummaryError::Transport("connection refused".to_string()),
            SummaryError::Api {
                status: 500,
                message: "API Error".to_string(),
            },
            SummaryError::MalformedBody,
            SummaryError::MissingSummary,
            SummaryError::Unexpected("boom".to_string()),
        ];
        for err in all {
            assert!(err.to_string().starts_with("Error"), "{err}");
        }
    }

    #[test]
    fn test_api_error_embeds_message() {
        let err = SummaryError::Api {
            status: 502,
            message: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "Error from Perplexity API: upstream down");
    }
}
