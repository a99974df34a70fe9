//! Error types for the search service boundary

use thiserror::Error;

/// Failures raised by [`crate::service::SearchService`] calls.
///
/// Every variant is handled where the asynchronous call resolves;
/// nothing here ever reaches the presentation layer as a fault. An
/// empty result set is not an error, and neither is a response that
/// arrives after its request has been superseded.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    BadEndpoint(#[from] url::ParseError),
}
