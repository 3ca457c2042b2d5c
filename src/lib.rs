//! clipfetch — a Telegram bot that turns media links into delivered files.
//!
//! A submitted URL is classified ([`classify`]), acquired under duration and
//! size ceilings ([`fetch`]), delivered back to the chat ([`deliver`],
//! [`bot`]) and deleted. A retention sweeper ([`sweep`]) reclaims anything a
//! request leaked.
//!
//! # Architecture
//!
//! - [`config`] - immutable startup configuration from the environment
//! - [`classify`] - pure URL → platform classification
//! - [`fetch`] - acquisition pipeline: sources, ceilings, file lifecycle
//! - [`deliver`] - delivery sink seam and cleanup-after-delivery
//! - [`sweep`] - recurring retention sweeper
//! - [`bot`] - Telegram dispatcher, commands, per-request lifecycle
//! - [`units`] - human-readable sizes and durations

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod classify;
pub mod config;
pub mod deliver;
pub mod fetch;
pub mod sweep;
pub mod units;

// Re-export commonly used types
pub use classify::{Platform, classify};
pub use config::{Config, ConfigError};
pub use deliver::{DeliverySink, deliver_and_discard};
pub use fetch::{FetchError, Limits, MediaArtifact, MediaFormat, MediaHttpClient};
