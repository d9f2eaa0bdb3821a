//! HTTP client for the Perplexity summarization endpoint.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::PerplexityConfig;

use super::error::SummaryError;
use super::Summarizer;

/// Placeholder used when a failed response carries no `error` field.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Outbound payload: `{query, focus, context?}`.
#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    query: &'a str,
    focus: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// Client for the Perplexity API.
#[derive(Clone)]
pub struct PerplexityClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl PerplexityClient {
    /// Create a client from configuration.
    ///
    /// A missing API key is accepted here; it surfaces per request as
    /// [`SummaryError::MissingApiKey`].
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &PerplexityConfig) -> Result<Self, SummaryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SummaryError::Unexpected(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &PerplexityConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Whether a credential is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Summarizer for PerplexityClient {
    async fn generate_summary(
        &self,
        query: &str,
        focus_urls: &[String],
        context: Option<&str>,
    ) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;

        let payload = SummaryRequest {
            query,
            focus: focus_urls,
            context: context.filter(|c| !c.is_empty()),
        };

        tracing::debug!(
            focus = focus_urls.len(),
            with_context = payload.context.is_some(),
            "Requesting summary"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|_| SummaryError::MalformedBody)?;

        if status == reqwest::StatusCode::OK {
            return body
                .get("summary")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or(SummaryError::MissingSummary);
        }

        let message = match body.get("error") {
            Some(Value::String(msg)) => msg.clone(),
            Some(Value::Null) | None => UNKNOWN_ERROR.to_string(),
            Some(other) => other.to_string(),
        };

        tracing::warn!(status = status.as_u16(), %message, "Perplexity API returned an error");

        Err(SummaryError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{any, body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, api_key: Option<&str>) -> PerplexityClient {
        let config = PerplexityConfig {
            api_key: api_key.map(str::to_string),
            endpoint: format!("{}/chat/completions", server.uri()),
        };
        PerplexityClient::new(&config).unwrap()
    }

    fn urls() -> Vec<String> {
        vec!["http://test.com".to_string()]
    }

    #[tokio::test]
    async fn test_generate_summary_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test_api_key"))
            .and(body_json(json!({
                "query": "Test query",
                "focus": ["http://test.com"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "Test summary"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test_api_key"));
        let summary = client
            .generate_summary("Test query", &urls(), None)
            .await
            .unwrap();

        assert_eq!(summary, "Test summary");
    }

    #[tokio::test]
    async fn test_generate_summary_with_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "query": "Test query",
                "focus": ["http://test.com"],
                "context": "Previous context"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"summary": "Test summary with context"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test_api_key"));
        let summary = client
            .generate_summary("Test query", &urls(), Some("Previous context"))
            .await
            .unwrap();

        assert_eq!(summary, "Test summary with context");
    }

    #[tokio::test]
    async fn test_empty_context_is_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"query": "q", "focus": []})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "s"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let summary = client.generate_summary("q", &[], Some("")).await.unwrap();
        assert_eq!(summary, "s");
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "API Error"})))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test_api_key"));
        let err = client
            .generate_summary("Test query", &urls(), None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SummaryError::Api {
                status: 500,
                message: "API Error".to_string()
            }
        );
        let text = err.to_string();
        assert!(text.starts_with("Error from Perplexity API"));
        assert!(text.contains("API Error"));
    }

    #[tokio::test]
    async fn test_api_error_without_message_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let err = client.generate_summary("q", &urls(), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Error from Perplexity API: Unknown error");
    }

    #[tokio::test]
    async fn test_missing_api_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.generate_summary("query", &urls(), None).await.unwrap_err();

        assert_eq!(err, SummaryError::MissingApiKey);
        assert_eq!(
            err.to_string(),
            "Error: PERPLEXITY_API_KEY not set in environment variables"
        );
    }

    #[tokio::test]
    async fn test_unsendable_api_key_is_unexpected_error() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad\nkey"));
        let err = client.generate_summary("query", &urls(), None).await.unwrap_err();

        assert!(matches!(err, SummaryError::Unexpected(_)));
        assert!(err.to_string().starts_with("Error: Unexpected error:"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let err = client.generate_summary("q", &urls(), None).await.unwrap_err();
        assert_eq!(err, SummaryError::MalformedBody);
    }

    #[tokio::test]
    async fn test_ok_without_summary_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "nope"})))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let err = client.generate_summary("q", &urls(), None).await.unwrap_err();
        assert_eq!(err, SummaryError::MissingSummary);
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let config = PerplexityConfig {
            api_key: Some("k".to_string()),
            endpoint: "http://127.0.0.1:1/chat/completions".to_string(),
        };
        let client = PerplexityClient::new(&config).unwrap();
        let err = client.generate_summary("q", &urls(), None).await.unwrap_err();

        assert!(matches!(err, SummaryError::Transport(_)), "{err:?}");
        assert!(err.to_string().starts_with("Error from Perplexity API"));
    }
}
