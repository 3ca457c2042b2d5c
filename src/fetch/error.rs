//! Error taxonomy for the acquisition and delivery pipeline.
//!
//! Every failure the pipeline can produce is one of these variants, and the
//! `Display` text is exactly what the requester sees in the edited status
//! message — short diagnostics, no stack traces or internal identifiers.

use thiserror::Error;

use crate::units::{format_duration, format_size};

fn fmt_duration(secs: &u64) -> String {
    format_duration(*secs)
}

fn fmt_size(bytes: &u64) -> String {
    format_size(*bytes)
}

/// Tagged outcome of a failed acquisition or delivery.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The reported media duration exceeds the configured ceiling.
    ///
    /// Raised strictly before any byte is downloaded.
    #[error(
        "video is too long ({}), the limit is {}",
        fmt_duration(.actual_secs),
        fmt_duration(.limit_secs)
    )]
    DurationExceeded {
        /// Duration the platform reported for the media.
        actual_secs: u64,
        /// Configured duration ceiling.
        limit_secs: u64,
    },

    /// The downloaded file exceeds the configured size ceiling.
    ///
    /// The offending file has already been deleted when this is returned.
    #[error(
        "file is too large ({}), the limit is {}",
        fmt_size(.size_bytes),
        fmt_size(.limit_bytes)
    )]
    SizeExceeded {
        /// Measured on-disk size.
        size_bytes: u64,
        /// Configured size ceiling.
        limit_bytes: u64,
    },

    /// No media could be located on the pinboard page.
    #[error("no video found on the page")]
    NotFound,

    /// The external transcoder reported a failure.
    #[error("audio conversion failed: {detail}")]
    TranscodeFailed {
        /// Short description of the transcoder failure.
        detail: String,
    },

    /// A network or download-layer failure (HTTP, yt-dlp, local I/O).
    ///
    /// No partially written file is left behind when this is returned.
    #[error("download failed: {detail}")]
    NetworkFailed {
        /// Short description of the failure.
        detail: String,
    },

    /// The delivery transport rejected the file.
    #[error("could not send the file: {detail}")]
    SendFailed {
        /// Short description of the transport failure.
        detail: String,
    },
}

impl FetchError {
    /// Creates a duration-ceiling violation.
    #[must_use]
    pub fn duration_exceeded(actual_secs: u64, limit_secs: u64) -> Self {
        Self::DurationExceeded {
            actual_secs,
            limit_secs,
        }
    }

    /// Creates a size-ceiling violation carrying the measured size.
    #[must_use]
    pub fn size_exceeded(size_bytes: u64, limit_bytes: u64) -> Self {
        Self::SizeExceeded {
            size_bytes,
            limit_bytes,
        }
    }

    /// Creates a transcoder failure.
    pub fn transcode(detail: impl Into<String>) -> Self {
        Self::TranscodeFailed {
            detail: detail.into(),
        }
    }

    /// Creates a download-layer failure.
    pub fn network(detail: impl Into<String>) -> Self {
        Self::NetworkFailed {
            detail: detail.into(),
        }
    }

    /// Creates a delivery failure.
    pub fn send(detail: impl Into<String>) -> Self {
        Self::SendFailed {
            detail: detail.into(),
        }
    }
}
