use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Response};

/// Builds the single outbound HTTP client shared by every provider wrapper.
/// Every request made through it is bounded by `timeout_secs`.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Turns a non-2xx response into a readable `"{status}: {body}"` description.
/// Returns the response untouched when the status is a success.
pub async fn error_for_status(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("{status}: {}", body.trim()))
}
