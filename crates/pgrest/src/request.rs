//! A fully materialized request, ready to send.

use crate::qb::{Operation, SingleRowMode};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

/// One HTTP request compiled from a builder chain.
///
/// Returned by [`QueryBuilder::build_request`](crate::QueryBuilder::build_request)
/// so the exact wire form can be inspected without sending anything.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub table: String,
    pub operation: Operation,
    pub mode: SingleRowMode,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Serialized JSON body (mutations only).
    pub body: Option<String>,
}

impl RestRequest {
    /// Header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded query parameters in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Body parsed back into JSON.
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
    }
}
