//! Error types for the audit log.

use thiserror::Error;

/// Failures while writing or reading audit records.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Datastore URL or key not configured.
    #[error("SUPABASE_URL and SUPABASE_API_KEY must be set")]
    MissingConfig,

    /// API key cannot be sent as a header value.
    #[error("invalid Supabase API key: {0}")]
    InvalidApiKey(String),

    /// Insert failed; carries the datastore's message.
    #[error("failed to save query log: {0}")]
    Save(String),

    /// Lookup failed; carries the datastore's message.
    #[error("failed to fetch query log: {0}")]
    Fetch(String),
}
