//! Audit log of handled queries.
//!
//! Writes are best-effort: a failed write is reported through `tracing` and
//! never reaches the caller.

pub mod client;
pub mod error;
pub mod record;

pub use client::{init_client, SupabaseClient, QUERY_LOGS_TABLE};
pub use error::AuditError;
pub use record::{QueryLogRecord, RecordId};

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;

use crate::config::SupabaseConfig;

/// Sink for audit records on the request path.
#[async_trait]
pub trait QueryLogger: Send + Sync {
    /// Persist one record.
    ///
    /// # Errors
    /// Returns an [`AuditError`] if the record could not be written.
    async fn log_query(
        &self,
        query: &str,
        response: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AuditError>;
}

/// Production logger: initializes a Supabase client per call and inserts the
/// row. Missing configuration is reported as a logging fault at call time.
pub struct SupabaseQueryLogger {
    config: SupabaseConfig,
    http: reqwest::Client,
}

impl SupabaseQueryLogger {
    /// Create a logger sharing the given connection pool.
    #[must_use]
    pub const fn new(config: SupabaseConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Whether both datastore settings are present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.url.is_some() && self.config.api_key.is_some()
    }
}

#[async_trait]
impl QueryLogger for SupabaseQueryLogger {
    async fn log_query(
        &self,
        query: &str,
        response: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), AuditError> {
        let client = SupabaseClient::from_config(&self.config, self.http.clone())?;
        let record = client.save_query_log(query, response, timestamp).await?;
        tracing::debug!(id = ?record.and_then(|r| r.id), "Saved query log");
        Ok(())
    }
}

/// Run a side effect whose failure must not affect the caller.
///
/// Errors and panics are logged at `warn` and swallowed; control always
/// returns. Yields the value on success.
pub async fn best_effort<F, T, E>(operation: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Display + Send,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(operation, error = %e, "Best-effort operation failed");
            None
        }
        Err(_) => {
            tracing::warn!(operation, "Best-effort operation panicked");
            None
        }
    }
}
