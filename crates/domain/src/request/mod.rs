//! HTTP request domain types

mod method;
mod spec;

pub use method::HttpMethod;
pub use spec::{CONTENT_TYPE_JSON, RequestSpec};
