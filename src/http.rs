//! HTTP client utilities
//!
//! Provides a reqwest::Client configured with timeouts. System proxy
//! env vars (HTTP_PROXY / HTTPS_PROXY / NO_PROXY) are honored by the
//! default client builder.

use reqwest::Client;
use std::time::Duration;

/// Build a reqwest Client with the given timeout
pub fn client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("userlens/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
}
