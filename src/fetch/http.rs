//! Shared HTTP client for page fetches and streaming media downloads.
//!
//! One `reqwest` client is built at startup and reused for every request,
//! taking advantage of connection pooling. Media bodies are streamed to disk
//! chunk by chunk; a failure mid-stream removes the partial file before the
//! error is returned, so a `NetworkFailed` outcome never leaves anything in
//! local storage.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::FetchError;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const READ_TIMEOUT_SECS: u64 = 300;

/// Browser-like User-Agent used for pinboard page fetches.
///
/// Some pinboard pages reject requests that identify as a tool, so page
/// scraping impersonates an ordinary browser. Media downloads keep the
/// default identifying User-Agent.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn default_user_agent() -> String {
    format!("clipfetch/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client wrapper shared by the pinboard locator and acquirer.
#[derive(Debug, Clone)]
pub struct MediaHttpClient {
    client: Client,
}

impl Default for MediaHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaHttpClient {
    /// Creates the client with 30 s connect / 5 min read timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the client builder fails with the static configuration,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches a page body as text, identifying as a browser.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NetworkFailed`] on transport errors or non-2xx
    /// responses.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| FetchError::network(format!("page fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!("HTTP {status} fetching page")));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::network(format!("page body unreadable: {e}")))
    }

    /// Streams a media URL to `dest`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NetworkFailed`] on any transport or I/O
    /// failure. The partial file at `dest` is removed before the error is
    /// returned.
    #[instrument(skip(self), fields(url = %url, dest = %dest.display()))]
    pub async fn download_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::network(format!("invalid media URL: {url}")));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(format!("media request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!("HTTP {status} fetching media")));
        }

        let file = File::create(dest)
            .await
            .map_err(|e| FetchError::network(format!("cannot create local file: {e}")))?;
        let mut writer = BufWriter::new(file);

        let mut stream = response.bytes_stream();
        let mut bytes_written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return abort_partial(dest, format!("stream interrupted: {e}")).await,
            };
            if let Err(e) = writer.write_all(&chunk).await {
                return abort_partial(dest, format!("local write failed: {e}")).await;
            }
            bytes_written += chunk.len() as u64;
        }
        if let Err(e) = writer.flush().await {
            return abort_partial(dest, format!("local write failed: {e}")).await;
        }

        debug!(bytes_written, "media download complete");
        Ok(bytes_written)
    }
}

/// Removes a partially written file and converts the failure into the
/// pipeline error. A successful result must never reference a partial file.
async fn abort_partial(dest: &Path, detail: String) -> Result<u64, FetchError> {
    if let Err(e) = tokio::fs::remove_file(dest).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %dest.display(), error = %e, "could not remove partial file");
        }
    }
    Err(FetchError::network(detail))
}
