//! Shared HTTP client construction for the weather and geocoding adapters

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;

use crate::error::FetchError;

pub const USER_AGENT: &str = concat!("routecast/", env!("CARGO_PKG_VERSION"));

/// Build a client with a request timeout and transient-error retries.
/// `max_retries = 0` sends every request exactly once.
pub fn build_client(
    timeout_seconds: u32,
    max_retries: u32,
    user_agent: &str,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(user_agent)
        .build()?;

    let mut builder = ClientBuilder::new(client);
    if max_retries > 0 {
        let policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
    }
    Ok(builder.build())
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Turn a non-success response into [`FetchError::Status`]
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(fallback);

    Err(FetchError::Status {
        status: status.as_u16(),
        message,
    })
}
