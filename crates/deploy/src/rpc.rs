//! Shared utilities for talking to Ethereum JSON-RPC endpoints.

use std::time::{Duration, Instant};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Default timeout for a single RPC request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client(request_timeout: Duration) -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
///
/// A `null` result deserializes into `Option::None` when `T` is an option,
/// which is how pending receipts are reported.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {} request", method))?;

    let result: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", method))?;

    if let Some(error) = result.get("error") {
        anyhow::bail!(
            "{} failed: {}",
            method,
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown RPC error")
        );
    }

    let result_value = result
        .get("result")
        .with_context(|| format!("No result in {} response", method))?
        .clone();

    serde_json::from_value(result_value)
        .with_context(|| format!("Failed to deserialize {} result", method))
}

/// Repeatedly call `poll_fn` until it yields a value.
///
/// `Ok(None)` means "not yet" and is retried after `interval`. Errors abort
/// immediately. Without a `timeout` this waits forever.
pub async fn poll_until<T, F, Fut>(
    name: &str,
    interval: Duration,
    timeout: Option<Duration>,
    poll_fn: F,
) -> Result<T, anyhow::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Option<T>, anyhow::Error>>,
{
    let start = Instant::now();

    loop {
        if let Some(value) = poll_fn().await? {
            return Ok(value);
        }

        if let Some(timeout) = timeout {
            if start.elapsed() > timeout {
                anyhow::bail!("Timeout waiting for {} after {:?}", name, timeout);
            }
        }

        tracing::trace!(target = %name, "Not ready yet, polling again...");
        tokio::time::sleep(interval).await;
    }
}
