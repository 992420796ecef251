//! HTTP client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port. It times each exchange
//! from dispatch until the body has been fully received and parses the
//! body leniently.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::future::Future;
use std::time::{Duration, Instant};

use pulse_application::ports::{HttpClient, TransportError};
use pulse_domain::{HttpMethod, RequestSpec, ResponseSpec};
use reqwest::{Client, Method, Url};
use serde_json::Value;

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Settings for the reqwest adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Total per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Ignore `HTTP_PROXY` and friends.
    pub no_proxy: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("pulse/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
            no_proxy: false,
        }
    }
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new(config: &HttpClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn timeout_ms(&self) -> u64 {
        self.timeout.map_or(0, |t| t.as_millis() as u64)
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: self.timeout_ms(),
            };
        }

        let message = error_chain(error);
        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("dns")
                || lowered.contains("resolve")
                || lowered.contains("lookup")
            {
                return TransportError::Dns { host, message };
            }
            if lowered.contains("refused") {
                let port = error
                    .url()
                    .and_then(Url::port_or_known_default)
                    .unwrap_or(80);
                return TransportError::ConnectionRefused { host, port };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::Other(format!("more than {MAX_REDIRECTS} redirects"));
        }

        TransportError::Other(message)
    }
}

/// Formats an error followed by its sources, since reqwest keeps the
/// useful part (e.g. "Connection refused") in the source chain.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Parses a response body, substituting an empty object for empty or
/// invalid JSON.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return ResponseSpec::empty_body();
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        tracing::debug!(error = %e, size = bytes.len(), "response body is not JSON");
        ResponseSpec::empty_body()
    })
}

impl HttpClient for ReqwestHttpClient {
    fn send(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseSpec, TransportError>> + Send {
        let method = Self::to_reqwest_method(request.method);
        let url = request.url.clone();
        let headers = request.headers.clone();
        let body = request.body.clone();

        async move {
            let parsed_url =
                Url::parse(&url).map_err(|e| TransportError::InvalidUrl(format!("{e}: {url}")))?;

            let mut builder = self.client.request(method, parsed_url);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &body {
                let payload =
                    serde_json::to_vec(body).map_err(|e| TransportError::Other(e.to_string()))?;
                builder = builder.body(payload);
            }

            let start = Instant::now();
            let response = builder.send().await.map_err(|e| self.map_error(&e))?;

            let status = response.status().as_u16();
            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let bytes = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    self.map_error(&e)
                } else {
                    TransportError::Body(error_chain(&e))
                }
            })?;
            let elapsed = start.elapsed();

            Ok(ResponseSpec::new(
                status,
                response_headers,
                parse_body(&bytes),
                bytes.len(),
                elapsed,
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, post};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn spawn_server() -> SocketAddr {
        let app = Router::new()
            .route("/text", get(|| async { "definitely not json" }))
            .route("/users", get(|| async { axum::Json(json!([{"id": 1}])) }))
            .route(
                "/echo",
                post(|headers: HeaderMap, body: String| async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    axum::Json(json!({"content_type": content_type, "raw": body}))
                }),
            )
            .route("/posts/1", delete(|| async { StatusCode::NO_CONTENT }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client() -> ReqwestHttpClient {
        let config = HttpClientConfig {
            no_proxy: true,
            ..HttpClientConfig::default()
        };
        ReqwestHttpClient::new(&config).expect("client")
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_parse_body_is_lenient() {
        assert_eq!(parse_body(br#"{"id": 101}"#), json!({"id": 101}));
        assert_eq!(parse_body(b"[1, 2]"), json!([1, 2]));
        assert_eq!(parse_body(b"<html>oops</html>"), json!({}));
        assert_eq!(parse_body(b""), json!({}));
    }

    #[test]
    fn test_default_config_has_no_timeout() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, None);
        assert!(config.user_agent.starts_with("pulse/"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_transport_error() {
        let result = client().send(&RequestSpec::get("not a url")).await;
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client()
            .send(&RequestSpec::get(format!("http://{addr}/users")))
            .await;

        assert!(matches!(
            result,
            Err(TransportError::ConnectionRefused { .. } | TransportError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_json_body_is_parsed() {
        let addr = spawn_server().await;
        let response = client()
            .send(&RequestSpec::get(format!("http://{addr}/users")))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!([{"id": 1}]));
        assert_eq!(response.size, r#"[{"id":1}]"#.len());
    }

    #[tokio::test]
    async fn test_non_json_body_becomes_empty_object() {
        let addr = spawn_server().await;
        let response = client()
            .send(&RequestSpec::get(format!("http://{addr}/text")))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, json!({}));
        assert_eq!(response.size, "definitely not json".len());
    }

    #[tokio::test]
    async fn test_json_request_body_and_content_type_are_sent() {
        let addr = spawn_server().await;
        let request = RequestSpec::post(format!("http://{addr}/echo"), json!({"title": "x"}));

        let response = client().send(&request).await.unwrap();

        assert_eq!(response.body["content_type"], json!("application/json"));
        let raw: Value =
            serde_json::from_str(response.body["raw"].as_str().unwrap_or_default()).unwrap();
        assert_eq!(raw, json!({"title": "x"}));
    }

    #[tokio::test]
    async fn test_no_content_response() {
        let addr = spawn_server().await;
        let response = client()
            .send(&RequestSpec::delete(format!("http://{addr}/posts/1")))
            .await
            .unwrap();

        assert_eq!(response.status, 204);
        assert_eq!(response.body, json!({}));
        assert_eq!(response.size, 0);
    }
}
