//! Retention sweeper: reclaims files the request lifecycle leaked.
//!
//! The set of retained files is never tracked in memory; every run re-derives
//! it by listing the download directory and deletes entries older than the
//! retention threshold (measured from last-modified time). Deleting a file
//! the lifecycle controller is about to reference is an accepted race: both
//! sides treat a missing file as already handled.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

/// Deletes entries in `dir` whose last-modified age exceeds `max_age`.
///
/// Per-entry failures (including files deleted concurrently by a finishing
/// request) are logged and skipped, never fatal. Idempotent: a second run
/// with no new files deletes nothing. Returns the number of deleted entries.
pub async fn sweep(dir: &Path, max_age: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list download directory");
            return 0;
        }
    };

    let mut deleted = 0usize;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "directory listing interrupted");
                break;
            }
        };
        let path = entry.path();

        let modified = match entry.metadata().await.and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let age = modified.elapsed().unwrap_or(Duration::ZERO);
        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), age_secs = age.as_secs(), "removed stale file");
                deleted += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not remove stale file");
            }
        }
    }

    if deleted > 0 {
        debug!(deleted, "sweep finished");
    }
    deleted
}

/// Spawns the recurring sweeper task.
///
/// The first tick fires immediately, so storage is swept once at startup and
/// then every `interval`.
pub fn spawn(dir: PathBuf, interval: Duration, max_age: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            sweep(&dir, max_age).await;
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sweep_removes_entries_past_the_threshold() {
        let dir = TempDir::new().unwrap();
        for name in ["a.mp4", "b.mp3", "c.audio"] {
            std::fs::write(dir.path().join(name), b"stale").unwrap();
        }
        // Let the files age past a zero threshold.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let deleted = sweep(dir.path(), Duration::ZERO).await;
        assert_eq!(deleted, 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("old.mp4"), b"stale").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(sweep(dir.path(), Duration::ZERO).await, 1);
        // Second run with no new files: nothing to delete, no errors.
        assert_eq!(sweep(dir.path(), Duration::ZERO).await, 0);
    }

    #[tokio::test]
    async fn test_sweep_keeps_files_younger_than_the_threshold() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fresh.mp4"), b"in-flight").unwrap();

        let deleted = sweep(dir.path(), Duration::from_secs(3600)).await;
        assert_eq!(deleted, 0);
        assert!(dir.path().join("fresh.mp4").exists());
    }

    #[tokio::test]
    async fn test_sweep_on_missing_directory_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("never-created");
        assert_eq!(sweep(&gone, Duration::ZERO).await, 0);
    }
}
