// ABOUTME: Shared HTTP client builders with timeout configuration
// ABOUTME: Provides OAuth and API clients so callers never build ad-hoc clients

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a new HTTP client with custom timeout settings
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Create a new HTTP client optimized for OAuth flows
///
/// Token exchanges should be fast, so timeouts are short.
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(15, 5)
}

/// Create a new HTTP client for directory API calls
#[must_use]
pub fn api_client() -> Client {
    create_client_with_timeout(60, 10)
}
