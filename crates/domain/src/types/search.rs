//! GIF search request and response types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::SEARCH_PAGE_SIZE;
use crate::utils::query_string::QueryObject;

/// Search parameters sent as the query string
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub since: Option<DateTime<Utc>>,
    pub last_id: Option<String>,
    pub include_deleted: Option<bool>,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()), ..Self::default() }
    }

    /// One page of results, 1-based. Page 0 is treated as page 1.
    pub fn page(q: impl Into<String>, page: u32) -> Self {
        let page = page.max(1);
        Self {
            limit: Some(SEARCH_PAGE_SIZE),
            offset: Some((page - 1).saturating_mul(SEARCH_PAGE_SIZE)),
            ..Self::new(q)
        }
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn after(mut self, last_id: impl Into<String>) -> Self {
        self.last_id = Some(last_id.into());
        self
    }

    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = Some(include);
        self
    }

    /// Query parameters under their wire names; unset fields are omitted.
    pub fn to_query_object(&self) -> QueryObject {
        QueryObject::new()
            .with("q", self.q.clone())
            .with("limit", self.limit)
            .with("offset", self.offset)
            .with("since", self.since)
            .with("lastId", self.last_id.clone())
            .with("includeDeleted", self.include_deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub total_count: u64,
    pub offset: u64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub status: u16,
    pub msg: String,
    pub response_id: String,
}

impl Default for Meta {
    fn default() -> Self {
        Self { status: 200, msg: String::new(), response_id: String::new() }
    }
}

/// One search hit. Unknown fields are ignored; missing ones default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Gif {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub slug: String,
    pub url: String,
    pub bitly_url: String,
    pub embed_url: String,
    pub username: String,
    pub source: String,
    pub rating: String,
    pub title: String,
    pub alt_text: String,
    pub import_datetime: String,
    pub trending_datetime: String,
    /// Rendition name to its attributes (`url`, `width`, `height`, ...).
    pub images: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Gif {
    /// URL of the named rendition, e.g. `"fixed_height"`.
    pub fn image_url(&self, rendition: &str) -> Option<&str> {
        self.images.get(rendition).and_then(|image| image.get("url")).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub data: Vec<Gif>,
    pub pagination: Pagination,
    pub meta: Meta,
}
