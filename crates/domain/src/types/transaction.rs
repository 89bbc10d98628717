//! Plain-data transaction types
//!
//! [`TransactionRecord`] is what gets persisted; the live transaction with
//! its waiters lives in `gifscout-core`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GifScoutError;
use crate::impl_domain_status_conversions;
use crate::utils::query_string::{append_query, QueryObject};

/// Lifecycle of a transaction. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    #[default]
    Queued,
    InProgress,
    Completed,
}

impl_domain_status_conversions!(TransactionStatus {
    Queued => "queued",
    InProgress => "in-progress",
    Completed => "completed",
});

impl TransactionStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InProgress)
                | (Self::Queued, Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }

    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one HTTP call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self { url: url.into(), method, ..Self::default() }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_query(mut self, query: QueryObject) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// URL with the encoded query appended.
    pub fn full_url(&self) -> String {
        match &self.query {
            Some(query) => append_query(&self.url, query),
            None => self.url.clone(),
        }
    }
}

/// Request payload, selected by the `type` discriminant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionKind {
    Http(HttpRequest),
}

impl TransactionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
        }
    }
}

/// Per-transaction settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOptions {
    /// Logical lane label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(default)]
    pub retry: bool,
    /// Extra runs allowed when `retry` is set.
    #[serde(default)]
    pub retry_attempts: u32,
}

impl TransactionOptions {
    pub fn retrying(attempts: u32) -> Self {
        Self { retry: true, retry_attempts: attempts, ..Self::default() }
    }

    pub fn in_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }
}

/// Persisted snapshot of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub status: TransactionStatus,
    pub request: TransactionKind,
    #[serde(flatten)]
    pub options: TransactionOptions,
    /// Set once the transaction completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TransactionOutcome>,
    pub created_at: i64,
}

impl TransactionRecord {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn response(&self) -> Option<&Value> {
        match &self.outcome {
            Some(TransactionOutcome::Response(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GifScoutError> {
        match &self.outcome {
            Some(TransactionOutcome::Error(error)) => Some(error),
            _ => None,
        }
    }
}

/// Stored result of a completed transaction
///
/// A `null` response is stored as `{"response": null}`; an unfinished record
/// has no `outcome` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionOutcome {
    Response(Value),
    Error(GifScoutError),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::ConnectionError;

    #[test]
    fn status_transitions_only_move_forward() {
        use TransactionStatus::*;
        assert!(Queued.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Queued.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Queued));
        assert!(!InProgress.can_transition_to(Queued));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn status_uses_kebab_case() {
        assert_eq!(serde_json::to_value(TransactionStatus::InProgress).unwrap(), json!("in-progress"));
        assert_eq!("in-progress".parse::<TransactionStatus>().unwrap(), TransactionStatus::InProgress);
    }

    #[test]
    fn full_url_appends_query() {
        let request = HttpRequest::get("https://api.test/gifs")
            .with_query(QueryObject::new().with("q", "cats").with("limit", 25_u32));
        assert_eq!(request.full_url(), "https://api.test/gifs?q=cats&limit=25");
        assert_eq!(HttpRequest::get("https://api.test/x").full_url(), "https://api.test/x");
    }

    #[test]
    fn record_layout_carries_type_discriminant() {
        let record = TransactionRecord {
            id: "0123456789abcdef01234567".into(),
            status: TransactionStatus::Completed,
            request: TransactionKind::Http(
                HttpRequest::post("https://api.test/upload")
                    .with_body(json!({ "name": "cat.gif" }))
                    .with_header("X-Trace", "1"),
            ),
            options: TransactionOptions::retrying(2).in_queue("uploads"),
            outcome: Some(TransactionOutcome::Error(GifScoutError::Connection(
                ConnectionError::from_status(404, None),
            ))),
            created_at: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["request"]["type"], "http");
        assert_eq!(json["request"]["method"], "POST");
        assert_eq!(json["retryAttempts"], 2);
        assert_eq!(json["queue"], "uploads");
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);

        let restored: TransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn null_response_survives_json() {
        let record = TransactionRecord {
            id: "0123456789abcdef01234567".into(),
            status: TransactionStatus::Completed,
            request: TransactionKind::Http(HttpRequest::delete("https://api.test/gifs/1")),
            options: TransactionOptions::default(),
            outcome: Some(TransactionOutcome::Response(Value::Null)),
            created_at: 1,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"], json!({ "response": null }));

        let restored: TransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored.response(), Some(&Value::Null));
        assert!(restored.error().is_none());
        assert_eq!(restored, record);
    }

    #[test]
    fn unfinished_record_has_no_outcome_key() {
        let record = TransactionRecord {
            id: "0123456789abcdef01234567".into(),
            status: TransactionStatus::Queued,
            request: TransactionKind::Http(HttpRequest::get("https://api.test/gifs")),
            options: TransactionOptions::default(),
            outcome: None,
            created_at: 1,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("outcome").is_none());
        assert!(serde_json::from_value::<TransactionRecord>(json).unwrap().outcome.is_none());
    }
}
