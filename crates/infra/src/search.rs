//! GIF search over the transaction queue

use std::sync::Arc;

use gifscout_core::{Transaction, Transport};
use gifscout_domain::{ApiConfig, HttpRequest, Result, SearchQuery, SearchResponse};
use tracing::{debug, instrument};

/// Queues search requests against `{base_uri}?api_key={key}`
#[derive(Clone)]
pub struct SearchGifClient {
    transport: Transport,
    base_uri: String,
    api_key: String,
}

impl SearchGifClient {
    pub fn new(transport: Transport, base_uri: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { transport, base_uri: base_uri.into(), api_key: api_key.into() }
    }

    pub fn from_config(transport: Transport, config: &ApiConfig) -> Self {
        Self::new(transport, config.base_uri.clone(), config.api_key.clone())
    }

    /// Search request for `query`, ready to be queued.
    pub fn request(&self, query: &SearchQuery) -> HttpRequest {
        HttpRequest::get(format!("{}?api_key={}", self.base_uri, self.api_key))
            .with_query(query.to_query_object())
    }

    #[instrument(skip_all, fields(q = ?query.q, offset = ?query.offset))]
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
        let transaction = Arc::new(Transaction::<SearchResponse>::http(self.request(&query)));
        debug!(transaction_id = %transaction.id(), "queueing search");
        self.transport.queue(transaction).await
    }

    /// One 1-based page of 25 results.
    pub async fn search_page(&self, q: &str, page: u32) -> Result<SearchResponse> {
        self.search(SearchQuery::page(q, page)).await
    }
}
