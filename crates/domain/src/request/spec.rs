//! Request specification type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HttpMethod;

/// Media type sent with every JSON request body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A single outbound HTTP request.
///
/// Requests are assembled once through the builder methods and are not
/// modified after being handed to an `HttpClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute target URL
    pub url: String,
    /// HTTP headers, ordered by name
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Optional JSON body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestSpec {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request carrying a JSON body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, url).with_json(body)
    }

    /// Creates a PUT request carrying a JSON body.
    #[must_use]
    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, url).with_json(body)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Attaches a JSON body and the matching `Content-Type` header.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.headers
            .insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
        self.body = Some(body);
        self
    }
}
