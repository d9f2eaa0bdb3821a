//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::audit::{QueryLogger, SupabaseQueryLogger};
use crate::config::RelayConfig;
use crate::summary::{PerplexityClient, Summarizer};

/// Shared application state. Immutable after construction.
pub struct AppState {
    /// Produces summaries.
    pub summarizer: Arc<dyn Summarizer>,
    /// Receives best-effort audit records.
    pub logger: Arc<dyn QueryLogger>,
}

impl AppState {
    /// Assemble state from explicit components.
    #[must_use]
    pub fn new(summarizer: Arc<dyn Summarizer>, logger: Arc<dyn QueryLogger>) -> Arc<Self> {
        Arc::new(Self { summarizer, logger })
    }

    /// Build the production state: Perplexity for summaries, Supabase for
    /// audit records, both sharing one connection pool.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(
        config: &RelayConfig,
    ) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {e}"))?;

        let summarizer = PerplexityClient::with_client(http.clone(), &config.perplexity);
        if !summarizer.has_api_key() {
            tracing::warn!("PERPLEXITY_API_KEY not set; every query will fail");
        }

        let logger = SupabaseQueryLogger::new(config.supabase.clone(), http);
        if !logger.is_configured() {
            tracing::warn!("Supabase not configured; query logs will not be saved");
        }

        Ok(Self::new(Arc::new(summarizer), Arc::new(logger)))
    }
}
