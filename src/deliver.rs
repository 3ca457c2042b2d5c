//! Delivery sink seam between the pipeline and the chat transport.
//!
//! The lifecycle controller hands a finished [`MediaArtifact`] to a
//! [`DeliverySink`] and deletes the local file afterwards regardless of the
//! outcome, so no request that reached delivery can leak a file.

use async_trait::async_trait;

use crate::fetch::{FetchError, MediaArtifact, MediaFormat, discard};

/// Where finished artifacts go. Implemented by the Telegram transport and by
/// test doubles.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Delivers the artifact to the requester.
    ///
    /// # Errors
    ///
    /// Transport failures are reported as [`FetchError::SendFailed`]; the
    /// sink must not panic on them.
    async fn deliver(&self, artifact: &MediaArtifact, format: MediaFormat)
    -> Result<(), FetchError>;
}

/// Delivers the artifact and deletes the local file, success or failure.
///
/// # Errors
///
/// Propagates the sink's [`FetchError::SendFailed`]; the file is already
/// gone by the time the error is returned.
pub async fn deliver_and_discard(
    sink: &dyn DeliverySink,
    artifact: MediaArtifact,
    format: MediaFormat,
) -> Result<(), FetchError> {
    let outcome = sink.deliver(&artifact, format).await;
    discard(&artifact.path).await;
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct RecordingSink {
        fail: bool,
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        async fn deliver(
            &self,
            artifact: &MediaArtifact,
            _format: MediaFormat,
        ) -> Result<(), FetchError> {
            assert!(artifact.path.exists(), "file must exist while delivering");
            if self.fail {
                Err(FetchError::send("transport rejected the file"))
            } else {
                Ok(())
            }
        }
    }

    async fn artifact_in(dir: &TempDir) -> (MediaArtifact, PathBuf) {
        let path = dir.path().join("abc12345_clip.mp4");
        tokio::fs::write(&path, b"media bytes").await.unwrap();
        let artifact = MediaArtifact {
            path: path.clone(),
            title: "clip".to_string(),
            size_bytes: 11,
            duration_secs: 0,
        };
        (artifact, path)
    }

    #[tokio::test]
    async fn test_successful_delivery_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let (artifact, path) = artifact_in(&dir).await;

        let sink = RecordingSink { fail: false };
        deliver_and_discard(&sink, artifact, MediaFormat::Video)
            .await
            .unwrap();
        assert!(!path.exists(), "file must be deleted after delivery");
    }

    #[tokio::test]
    async fn test_failed_delivery_still_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let (artifact, path) = artifact_in(&dir).await;

        let sink = RecordingSink { fail: true };
        let err = deliver_and_discard(&sink, artifact, MediaFormat::Audio)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SendFailed { .. }), "{err}");
        assert!(!path.exists(), "file must be deleted even when delivery fails");
    }
}
