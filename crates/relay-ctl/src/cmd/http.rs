//! Shared HTTP request helpers for CLI commands.

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use serde::Deserialize;

pub fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{}/api", port)
}

/// `/api/users/<name>`, with `name` percent-encoded as one path segment.
pub fn user_url(port: u16, name: &str) -> Result<Url> {
    let mut url = Url::parse(&base_url(port)).context("invalid API base URL")?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("API base URL cannot take path segments"))?
        .push("users")
        .push(name);
    Ok(url)
}

pub async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
        .await
        .with_context(|| format!("failed to connect to relayd at {} — is it running?", url))?
        .error_for_status()
        .with_context(|| format!("request to {} failed", url))?
        .json::<T>()
        .await
        .context("failed to parse response")
}
