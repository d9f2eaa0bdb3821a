//! Audit record stored in the `query_logs` table.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Row identifier as the datastore assigns it: serial or uuid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// `bigserial` / `int8` primary key.
    Int(i64),
    /// `uuid` or any other textual key.
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// One handled request as the datastore returns it.
///
/// Decoding is lenient: the timestamp is kept verbatim (with or without a
/// zone) and columns beyond the four known ones land in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryLogRecord {
    /// Identifier assigned by the datastore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// User query.
    #[serde(default)]
    pub query: String,
    /// Summary returned to the caller.
    #[serde(default)]
    pub response: String,
    /// Time the summary was produced, as stored.
    #[serde(default)]
    pub timestamp: String,
    /// Any other columns of the row.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryLogRecord {
    /// Parse `timestamp` as UTC. A value without a zone is taken as UTC.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|t| t.and_utc())
            })
    }
}

/// Insert payload; the datastore assigns `id`.
#[derive(Debug, Serialize)]
pub(crate) struct NewQueryLog<'a> {
    pub query: &'a str,
    pub response: &'a str,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decodes_naive_timestamp_and_uuid_id() {
        let record: QueryLogRecord = serde_json::from_value(json!({
            "id": "6f9c1d7e-3b1a-4c55-9d2e-8a7b6c5d4e3f",
            "query": "q",
            "response": "r",
            "timestamp": "2024-05-01T12:00:00.123456",
            "created_at": "2024-05-01T12:00:01"
        }))
        .unwrap();

        assert_eq!(
            record.id,
            Some(RecordId::Text("6f9c1d7e-3b1a-4c55-9d2e-8a7b6c5d4e3f".to_string()))
        );
        assert_eq!(record.extra.get("created_at"), Some(&json!("2024-05-01T12:00:01")));

        let parsed = record.timestamp_utc().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T12:00:00.123456+00:00");
    }

    #[test]
    fn test_timestamp_with_offset_is_normalized() {
        let record = QueryLogRecord {
            timestamp: "2024-05-01T14:00:00+02:00".to_string(),
            ..QueryLogRecord::default()
        };
        assert_eq!(
            record.timestamp_utc().unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let record = QueryLogRecord {
            timestamp: "yesterday".to_string(),
            ..QueryLogRecord::default()
        };
        assert!(record.timestamp_utc().is_none());
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::Int(42).to_string(), "42");
        assert_eq!(RecordId::Text("abc".to_string()).to_string(), "abc");
    }
}
