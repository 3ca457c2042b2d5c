//! Media acquisition pipeline: platform sources, ceilings, file lifecycle.
//!
//! The two sources ([`pinterest::PinterestSource`], [`youtube::YoutubeSource`])
//! produce a [`MediaArtifact`] or a [`FetchError`]; nothing in between. Any
//! artifact returned `Ok` satisfies `size_bytes <= max_file_size` — a file
//! over the ceiling is deleted here and converted into
//! [`FetchError::SizeExceeded`] before a caller can see it.

mod error;
pub mod filename;
mod http;
pub mod pinterest;
pub mod youtube;

pub use error::FetchError;
pub use http::{BROWSER_USER_AGENT, MediaHttpClient};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// The requested output format for video-platform media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// Raw video, lowest available quality, MP4 container.
    Video,
    /// Audio only, re-encoded to 128 kbps MP3.
    Audio,
}

impl MediaFormat {
    /// Target file extension for the format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// Lowercase label for status messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// The configured ceilings, derived from `Config` once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Size ceiling in bytes for any delivered file.
    pub max_file_size: u64,
    /// Duration ceiling in seconds for video-platform media.
    pub max_duration_secs: u64,
}

/// A successfully acquired, ceiling-compliant local media file.
#[derive(Debug, Clone)]
pub struct MediaArtifact {
    /// Local path, exclusively owned by the request that acquired it.
    pub path: PathBuf,
    /// Display title for the caption.
    pub title: String,
    /// Measured on-disk size.
    pub size_bytes: u64,
    /// Duration in seconds, 0 when unknown (pinboard media).
    pub duration_secs: u64,
}

/// Measures the downloaded file and enforces the size ceiling.
///
/// An over-ceiling file is deleted immediately; the caller never sees a
/// dangling oversized file.
///
/// # Errors
///
/// [`FetchError::SizeExceeded`] with the measured size, or
/// [`FetchError::NetworkFailed`] when the file cannot be measured.
pub(crate) async fn finalize_artifact(
    path: PathBuf,
    title: String,
    duration_secs: u64,
    max_file_size: u64,
) -> Result<MediaArtifact, FetchError> {
    let size_bytes = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            discard(&path).await;
            return Err(FetchError::network(format!(
                "downloaded file missing or unreadable: {e}"
            )));
        }
    };

    if size_bytes > max_file_size {
        discard(&path).await;
        return Err(FetchError::size_exceeded(size_bytes, max_file_size));
    }

    debug!(path = %path.display(), size_bytes, "artifact finalized");
    Ok(MediaArtifact {
        path,
        title,
        size_bytes,
        duration_secs,
    })
}

/// Best-effort file deletion; a missing file is fine (the sweeper may have
/// raced us), anything else is logged and swallowed.
pub async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed local file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove local file"),
    }
}
