//! Summary generation through the external summarization API.

pub mod client;
pub mod error;

pub use client::PerplexityClient;
pub use error::SummaryError;

use async_trait::async_trait;

/// Anything that can turn a query and focus URLs into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a summary for `query`, focused on `focus_urls`.
    ///
    /// `context` carries the previous summary for follow-up questions; an
    /// empty string is treated as absent.
    ///
    /// # Errors
    /// Returns a [`SummaryError`] describing why no summary was produced.
    async fn generate_summary(
        &self,
        query: &str,
        focus_urls: &[String],
        context: Option<&str>,
    ) -> Result<String, SummaryError>;
}
