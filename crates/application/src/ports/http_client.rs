//! HTTP client port

use std::future::Future;

use thiserror::Error;
use tokio::sync::watch;
use pulse_domain::{RequestSpec, ResponseSpec};

/// Errors raised when an HTTP exchange cannot complete.
///
/// A non-JSON body is not a transport error; adapters substitute an empty
/// object instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Host name resolution failed.
    #[error("could not resolve host '{host}': {message}")]
    Dns {
        /// Host that failed to resolve.
        host: String,
        /// Underlying error message.
        message: String,
    },

    /// The remote end refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The configured timeout elapsed.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that was exceeded.
        timeout_ms: u64,
    },

    /// The connection broke while the body was being received.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation so the runner can be
/// driven by a real network stack or by an in-memory double.
pub trait HttpClient: Send + Sync {
    /// Sends one request and waits for the complete response.
    ///
    /// The returned `ResponseSpec::elapsed` must cover dispatch until the
    /// last body byte and exclude body parsing.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the exchange cannot complete.
    fn send(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseSpec, TransportError>> + Send;
}

/// Handle used to request cancellation of a run.
///
/// Cancellation is cooperative: the runner checks it between scenarios and
/// never interrupts a request in flight.
#[derive(Debug)]
pub struct CancellationToken {
    sender: watch::Sender<bool>,
}

/// Receiving side of a `CancellationToken`.
#[derive(Debug, Clone)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Creates a token and its receiver.
    #[must_use]
    pub fn new() -> (Self, CancellationReceiver) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationReceiver { receiver })
    }

    /// Requests cancellation. Calling it more than once has no further effect.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl CancellationReceiver {
    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_observed_by_receivers() {
        let (token, receiver) = CancellationToken::new();
        let clone = receiver.clone();
        assert!(!receiver.is_cancelled());

        token.cancel();
        assert!(receiver.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_transport_error_messages() {
        let err = TransportError::ConnectionRefused {
            host: "localhost".to_string(),
            port: 8080,
        };
        assert_eq!(err.to_string(), "connection refused by localhost:8080");
        assert_eq!(
            TransportError::Timeout { timeout_ms: 500 }.to_string(),
            "request timed out after 500 ms"
        );
    }
}
