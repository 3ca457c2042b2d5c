//! Video-platform acquirer backed by the yt-dlp and ffmpeg binaries.
//!
//! Metadata (title, duration) is probed first with `yt-dlp -J`; the duration
//! ceiling is enforced strictly before any byte is downloaded. The video
//! path streams the lowest-quality rendition straight to storage; the audio
//! path downloads the best audio rendition to an intermediate file and
//! re-encodes it to 128 kbps MP3 with ffmpeg. A transcoder failure surfaces
//! as [`FetchError::TranscodeFailed`], distinct from the download-layer
//! [`FetchError::NetworkFailed`].

use std::path::{Path, PathBuf};
use std::process::Output;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::error::FetchError;
use super::filename::media_file_stem;
use super::{Limits, MediaArtifact, MediaFormat, discard, finalize_artifact};

/// Fixed bitrate for the audio re-encode.
const AUDIO_BITRATE: &str = "128k";

/// Lowest-quality selection: trades fidelity for speed and ceiling headroom.
const VIDEO_FORMAT_SELECTOR: &str = "worst[ext=mp4]/worst";
const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";

/// Subset of the yt-dlp `-J` output the pipeline needs.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    /// Display title of the media.
    pub title: String,
    /// Reported duration in seconds; absent for live or imageboard media.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl VideoMetadata {
    /// Duration in whole seconds, 0 when unknown.
    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        match self.duration {
            Some(d) if d.is_finite() && d > 0.0 => d as u64,
            _ => 0,
        }
    }
}

/// Acquires media from the video platform through external tools.
#[derive(Debug, Clone)]
pub struct YoutubeSource {
    ytdlp_bin: String,
    ffmpeg_bin: String,
}

impl YoutubeSource {
    /// Creates the source with the given tool binary names.
    pub fn new(ytdlp_bin: impl Into<String>, ffmpeg_bin: impl Into<String>) -> Self {
        Self {
            ytdlp_bin: ytdlp_bin.into(),
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }

    /// Fetches title and duration without downloading anything.
    ///
    /// # Errors
    ///
    /// [`FetchError::NetworkFailed`] when yt-dlp is missing, exits non-zero,
    /// or emits metadata the pipeline cannot read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn probe(&self, url: &str) -> Result<VideoMetadata, FetchError> {
        let output = self
            .run_ytdlp(&["-J", "--no-playlist", "--no-warnings", url])
            .await?;
        parse_metadata(&output.stdout)
    }

    /// Acquires the media at `url` in the requested format.
    ///
    /// # Errors
    ///
    /// [`FetchError::DurationExceeded`] before any download when the probed
    /// duration is over the ceiling; [`FetchError::SizeExceeded`] after the
    /// download when the file is over the ceiling (file already deleted);
    /// [`FetchError::TranscodeFailed`] when ffmpeg fails on the audio path;
    /// [`FetchError::NetworkFailed`] for everything download-layer.
    #[instrument(skip(self, download_dir, limits), fields(url = %url, ?format))]
    pub async fn acquire(
        &self,
        url: &str,
        format: MediaFormat,
        download_dir: &Path,
        limits: &Limits,
    ) -> Result<MediaArtifact, FetchError> {
        let metadata = self.probe(url).await?;
        let duration_secs = metadata.duration_secs();
        // Enforced before any byte is streamed.
        check_duration(duration_secs, limits.max_duration_secs)?;
        debug!(title = %metadata.title, duration_secs, "metadata probed");

        let stem = media_file_stem(&metadata.title);
        let path = match format {
            MediaFormat::Video => self.download_video(url, download_dir, &stem).await?,
            MediaFormat::Audio => self.download_audio(url, download_dir, &stem).await?,
        };

        finalize_artifact(path, metadata.title, duration_secs, limits.max_file_size).await
    }

    async fn download_video(
        &self,
        url: &str,
        download_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, FetchError> {
        let path = download_dir.join(format!("{stem}.{}", MediaFormat::Video.extension()));
        let dest = path.to_string_lossy().into_owned();
        if let Err(e) = self
            .run_ytdlp(&[
                "-f",
                VIDEO_FORMAT_SELECTOR,
                "--no-playlist",
                "--no-warnings",
                "--no-part",
                "-o",
                &dest,
                url,
            ])
            .await
        {
            discard(&path).await;
            discard(&part_sibling(&path)).await;
            return Err(e);
        }
        Ok(path)
    }

    async fn download_audio(
        &self,
        url: &str,
        download_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, FetchError> {
        // The intermediate keeps whatever container yt-dlp picked; ffmpeg
        // probes the content, so the extension is irrelevant.
        let source = download_dir.join(format!("{stem}.audio"));
        let target = download_dir.join(format!("{stem}.{}", MediaFormat::Audio.extension()));
        let source_arg = source.to_string_lossy().into_owned();
        let target_arg = target.to_string_lossy().into_owned();

        if let Err(e) = self
            .run_ytdlp(&[
                "-f",
                AUDIO_FORMAT_SELECTOR,
                "--no-playlist",
                "--no-warnings",
                "--no-part",
                "-o",
                &source_arg,
                url,
            ])
            .await
        {
            discard(&source).await;
            discard(&part_sibling(&source)).await;
            return Err(e);
        }

        let encode = Command::new(&self.ffmpeg_bin)
            .args([
                "-y",
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                &source_arg,
                "-vn",
                "-b:a",
                AUDIO_BITRATE,
                &target_arg,
            ])
            .output()
            .await;

        // The intermediate is gone on every path, success or failure.
        discard(&source).await;

        let output = match encode {
            Ok(output) => output,
            Err(e) => {
                discard(&target).await;
                return Err(if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::transcode(format!("`{}` is not installed", self.ffmpeg_bin))
                } else {
                    FetchError::transcode(format!("could not run {}: {e}", self.ffmpeg_bin))
                });
            }
        };
        if !output.status.success() {
            discard(&target).await;
            return Err(FetchError::transcode(stderr_summary(&output.stderr)));
        }

        Ok(target)
    }

    /// Runs yt-dlp and maps every failure mode to [`FetchError::NetworkFailed`].
    async fn run_ytdlp(&self, args: &[&str]) -> Result<Output, FetchError> {
        debug!(bin = %self.ytdlp_bin, ?args, "running downloader tool");
        let output = Command::new(&self.ytdlp_bin)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::network(format!("`{}` is not installed", self.ytdlp_bin))
                } else {
                    FetchError::network(format!("could not run {}: {e}", self.ytdlp_bin))
                }
            })?;
        if !output.status.success() {
            return Err(FetchError::network(stderr_summary(&output.stderr)));
        }
        Ok(output)
    }
}

/// yt-dlp stages an in-progress download at `<dest>.part` and only renames
/// it on success. `--no-part` disables the staging, but the sibling is still
/// discarded on failure in case a user config re-enables it.
fn part_sibling(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".part");
    PathBuf::from(raw)
}

/// Rejects media whose reported duration is over the ceiling.
fn check_duration(duration_secs: u64, limit_secs: u64) -> Result<(), FetchError> {
    if duration_secs > limit_secs {
        return Err(FetchError::duration_exceeded(duration_secs, limit_secs));
    }
    Ok(())
}

fn parse_metadata(raw: &[u8]) -> Result<VideoMetadata, FetchError> {
    serde_json::from_slice(raw)
        .map_err(|e| FetchError::network(format!("could not read video metadata: {e}")))
}

/// Last non-empty stderr line, the most useful part of tool output.
fn stderr_summary(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .unwrap_or("external tool failed")
        .to_string()
}
