//! Pinboard media locator and acquirer.
//!
//! Pinterest pages embed the direct video URL in one of two places: a
//! JSON-LD structured-data block, or an `og:video` meta tag. Extraction is
//! deliberately best-effort — the markup changes without notice — and fails
//! closed to [`FetchError::NotFound`] rather than attempting a fuller HTML
//! parse. A JSON-LD block that does not parse is skipped, not surfaced.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use super::error::FetchError;
use super::filename::media_file_name;
use super::http::MediaHttpClient;
use super::{MediaArtifact, finalize_artifact};

#[allow(clippy::expect_used)]
static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script type="application/ld\+json">(.*?)</script>"#)
        .expect("static regex is valid")
});

#[allow(clippy::expect_used)]
static OG_VIDEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta property="og:video" content="([^"]+)""#)
        .expect("static regex is valid")
});

/// Acquires media from pinboard pages.
#[derive(Debug, Clone)]
pub struct PinterestSource {
    http: MediaHttpClient,
}

impl PinterestSource {
    /// Creates the source over a shared HTTP client.
    #[must_use]
    pub fn new(http: MediaHttpClient) -> Self {
        Self { http }
    }

    /// Resolves a pinboard page URL to a direct media URL.
    ///
    /// The resolved URL's content type is not validated here; a mismatch
    /// surfaces later as a network or size failure.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotFound`] when neither extraction strategy yields a
    /// URL; [`FetchError::NetworkFailed`] when the page fetch itself fails.
    #[instrument(skip(self), fields(url = %page_url))]
    pub async fn locate(&self, page_url: &str) -> Result<String, FetchError> {
        let html = self.http.fetch_page(page_url).await?;
        extract_media_url(&html).ok_or(FetchError::NotFound)
    }

    /// Locates and downloads the media behind a pinboard page.
    ///
    /// Pinboard media carries no duration metadata, so only the size ceiling
    /// applies.
    ///
    /// # Errors
    ///
    /// Returns the [`locate`](Self::locate) errors, [`FetchError::NetworkFailed`]
    /// for the download itself, and [`FetchError::SizeExceeded`] when the
    /// downloaded file is over the ceiling (the file is deleted first).
    #[instrument(skip(self, download_dir), fields(url = %page_url))]
    pub async fn acquire(
        &self,
        page_url: &str,
        download_dir: &Path,
        max_file_size: u64,
    ) -> Result<MediaArtifact, FetchError> {
        let media_url = self.locate(page_url).await?;
        debug!(media_url = %media_url, "located pinboard media");

        let path = download_dir.join(media_file_name("pinterest", "mp4"));
        self.http.download_to_file(&media_url, &path).await?;

        finalize_artifact(path, "Pinterest video".to_string(), 0, max_file_size).await
    }
}

/// Extraction order: JSON-LD `video.contentUrl`, then the `og:video` meta
/// tag. Returns `None` when neither strategy yields a URL.
fn extract_media_url(html: &str) -> Option<String> {
    if let Some(block) = JSON_LD_RE.captures(html).and_then(|caps| caps.get(1)) {
        match serde_json::from_str::<serde_json::Value>(block.as_str()) {
            Ok(data) => {
                if let Some(url) = data
                    .get("video")
                    .and_then(|video| video.get("contentUrl"))
                    .and_then(|value| value.as_str())
                {
                    return Some(url.to_string());
                }
            }
            Err(e) => {
                // Malformed structured data falls through to the meta tag.
                debug!(error = %e, "JSON-LD block did not parse");
            }
        }
    }

    OG_VIDEO_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
