//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the run pipeline and the outside
//! world. Adapters in the infrastructure layer implement them.

mod clock;
mod http_client;
mod reporter;

pub use clock::Clock;
pub use http_client::{CancellationReceiver, CancellationToken, HttpClient, TransportError};
pub use reporter::Reporter;
