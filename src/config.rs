//! Startup configuration.
//!
//! Everything is resolved once from the environment at process start into an
//! immutable [`Config`] that is passed by reference into every component.
//! There are no ambient configuration lookups after startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default size ceiling for delivered files: 50 MB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
/// Default duration ceiling for video-platform media: 5 minutes.
pub const DEFAULT_MAX_DURATION_SECS: u64 = 300;
/// Default interval between retention sweeps: 30 minutes.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30 * 60;
/// Default age past which the sweeper reclaims a file: 1 hour.
pub const DEFAULT_RETENTION_SECS: u64 = 60 * 60;

/// Errors raised while reading configuration from the environment.
///
/// These are startup errors: an invalid value aborts the process rather than
/// silently falling back to a default.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bot access token is missing or empty.
    #[error("BOT_TOKEN is not set")]
    MissingToken,

    /// A numeric environment value failed to parse.
    #[error("invalid value for {key}: {value:?} (expected a non-negative integer)")]
    InvalidValue {
        /// The environment key that held the bad value.
        key: &'static str,
        /// The raw value as found in the environment.
        value: String,
    },
}

/// Immutable runtime configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot access token.
    pub bot_token: String,
    /// Directory that holds in-flight media files.
    pub download_dir: PathBuf,
    /// Size ceiling in bytes for any delivered file.
    pub max_file_size: u64,
    /// Duration ceiling in seconds for video-platform media.
    pub max_duration_secs: u64,
    /// How often the retention sweeper runs.
    pub sweep_interval: Duration,
    /// Age past which the sweeper deletes a file.
    pub retention: Duration,
    /// Name (or path) of the yt-dlp binary.
    pub ytdlp_bin: String,
    /// Name (or path) of the ffmpeg binary.
    pub ffmpeg_bin: String,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// `BOT_TOKEN` is required; everything else has a default. Recognised
    /// keys: `DOWNLOAD_DIR`, `MAX_FILE_SIZE_BYTES`, `MAX_DURATION_SECS`,
    /// `SWEEP_INTERVAL_SECS`, `FILE_RETENTION_SECS`, `YTDLP_BIN`,
    /// `FFMPEG_BIN`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the token is absent or a numeric value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = env::var("BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let download_dir = env::var("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("downloads"));

        let max_file_size = parse_limit(
            "MAX_FILE_SIZE_BYTES",
            env::var("MAX_FILE_SIZE_BYTES").ok().as_deref(),
            DEFAULT_MAX_FILE_SIZE,
        )?;
        let max_duration_secs = parse_limit(
            "MAX_DURATION_SECS",
            env::var("MAX_DURATION_SECS").ok().as_deref(),
            DEFAULT_MAX_DURATION_SECS,
        )?;
        let sweep_interval_secs = parse_limit(
            "SWEEP_INTERVAL_SECS",
            env::var("SWEEP_INTERVAL_SECS").ok().as_deref(),
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        let retention_secs = parse_limit(
            "FILE_RETENTION_SECS",
            env::var("FILE_RETENTION_SECS").ok().as_deref(),
            DEFAULT_RETENTION_SECS,
        )?;

        Ok(Self {
            bot_token,
            download_dir,
            max_file_size,
            max_duration_secs,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            retention: Duration::from_secs(retention_secs),
            ytdlp_bin: env::var("YTDLP_BIN").unwrap_or_else(|_| "yt-dlp".to_string()),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()),
        })
    }
}

/// Parses an optional environment value, falling back to `default` only when
/// the key is absent. A present-but-invalid value is an error.
fn parse_limit(key: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
