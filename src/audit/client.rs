//! Supabase REST client for the `query_logs` table.
//!
//! Talks to the `PostgREST` interface at `<project>/rest/v1/`.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::SupabaseConfig;

use super::error::AuditError;
use super::record::{NewQueryLog, QueryLogRecord};

/// Table receiving audit rows.
pub const QUERY_LOGS_TABLE: &str = "query_logs";

/// Client bound to one Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    headers: HeaderMap,
    table_url: String,
}

/// Build a client from configuration with a fresh HTTP connection pool.
///
/// # Errors
/// Returns [`AuditError::MissingConfig`] if the URL or key is absent.
pub fn init_client(config: &SupabaseConfig) -> Result<SupabaseClient, AuditError> {
    SupabaseClient::from_config(config, reqwest::Client::new())
}

impl SupabaseClient {
    /// Build a client that sends through `http`.
    ///
    /// # Errors
    /// Returns [`AuditError::MissingConfig`] if the URL or key is absent.
    pub fn from_config(config: &SupabaseConfig, http: reqwest::Client) -> Result<Self, AuditError> {
        let (Some(url), Some(api_key)) = (&config.url, &config.api_key) else {
            return Err(AuditError::MissingConfig);
        };

        let invalid_key =
            |e: reqwest::header::InvalidHeaderValue| AuditError::InvalidApiKey(e.to_string());

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(invalid_key)?,
        );

        let table_url = format!(
            "{}/rest/v1/{QUERY_LOGS_TABLE}",
            url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client: http,
            headers,
            table_url,
        })
    }

    /// Insert one audit row.
    ///
    /// Returns the stored row, or `None` when the datastore echoes no rows.
    ///
    /// # Errors
    /// Returns [`AuditError::Save`] with the datastore's message on failure.
    pub async fn save_query_log(
        &self,
        query: &str,
        response: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<QueryLogRecord>, AuditError> {
        let row = NewQueryLog {
            query,
            response,
            timestamp,
        };

        let request = self
            .client
            .post(&self.table_url)
            .headers(self.headers.clone())
            .header("Prefer", "return=representation")
            .json(&row);

        let rows = execute(request).await.map_err(AuditError::Save)?;
        Ok(rows.into_iter().next())
    }

    /// Fetch a row by identifier (integer or uuid). `None` if no such row exists.
    ///
    /// # Errors
    /// Returns [`AuditError::Fetch`] with the datastore's message on failure.
    pub async fn get_query_log_by_id(
        &self,
        id: impl Display + Send,
    ) -> Result<Option<QueryLogRecord>, AuditError> {
        let request = self
            .client
            .get(&self.table_url)
            .headers(self.headers.clone())
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]);

        let rows = execute(request).await.map_err(AuditError::Fetch)?;
        Ok(rows.into_iter().next())
    }
}

/// Send a `PostgREST` request and decode the row array, reducing any failure to
/// the underlying message.
async fn execute(request: reqwest::RequestBuilder) -> Result<Vec<QueryLogRecord>, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_message(status, &body));
    }

    response
        .json::<Vec<QueryLogRecord>>()
        .await
        .map_err(|e| e.to_string())
}

/// `PostgREST` errors look like `{"message": ..., "code": ..., "details": ...}`.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| format!("datastore returned status {status}"))
}
