//! Response specification type
//!
//! Contains the status, headers, parsed JSON body and network timing of a
//! single HTTP exchange.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP status code with semantic helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the canonical reason phrase for common status codes.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// The outcome of one HTTP exchange.
///
/// `body` is always a JSON value: bodies that are empty or fail to parse
/// are represented as an empty object. `elapsed` covers dispatch until the
/// last body byte arrived and nothing after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as a map.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Parsed JSON body.
    pub body: Value,
    /// Raw body size in bytes.
    pub size: usize,
    /// Network time.
    #[serde(rename = "elapsed_ms", with = "duration_millis")]
    pub elapsed: Duration,
}

impl ResponseSpec {
    /// Creates a new `ResponseSpec` from an already parsed body.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: HashMap<String, String>,
        body: Value,
        size: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            status: status.into().as_u16(),
            headers,
            body,
            size,
            elapsed,
        }
    }

    /// Shorthand for a response with no headers, used heavily by test doubles.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, HashMap::new(), body, 0, Duration::ZERO)
    }

    /// The body substituted when the payload is not valid JSON.
    #[must_use]
    pub fn empty_body() -> Value {
        Value::Object(Map::new())
    }

    /// Returns the status as a `StatusCode` struct.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::new(self.status)
    }

    /// Elapsed network time in whole milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// Looks up a top-level field of an object body.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_code_display() {
        assert_eq!(StatusCode::new(201).to_string(), "201 Created");
        assert_eq!(StatusCode::new(204).to_string(), "204 No Content");
        assert_eq!(StatusCode::new(418).to_string(), "418 Unknown");
    }

    #[test]
    fn test_field_lookup() {
        let response = ResponseSpec::json(201, json!({"id": 101, "title": "New Post"}));
        assert_eq!(response.field("id"), Some(&json!(101)));
        assert_eq!(response.field("missing"), None);

        let array = ResponseSpec::json(200, json!([1, 2]));
        assert_eq!(array.field("id"), None);
    }

    #[test]
    fn test_elapsed_serializes_as_millis() {
        let response = ResponseSpec::new(
            200,
            HashMap::new(),
            ResponseSpec::empty_body(),
            2,
            Duration::from_millis(150),
        );
        assert_eq!(response.elapsed_ms(), 150);

        let value = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(value["elapsed_ms"], json!(150));
        assert_eq!(value["body"], json!({}));
    }
}
