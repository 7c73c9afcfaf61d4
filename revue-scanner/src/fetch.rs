use crate::error::{Result, ScanError};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Build the HTTP client shared by the walker and the extractor.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("Revue/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
        .pool_idle_timeout(Duration::from_secs(90))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    Ok(client)
}

/// GET `url` and return its body. Transport failures and non-2xx statuses
/// are both errors; nothing is retried.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    debug!("Fetching {}", url);

    let start = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ScanError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| ScanError::Fetch {
        url: url.to_string(),
        source,
    })?;

    debug!(
        "Fetched {} ({} bytes in {:?})",
        url,
        body.len(),
        start.elapsed()
    );
    Ok(body)
}
