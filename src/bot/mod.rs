//! Telegram surface: shared per-process context and dispatcher wiring.

pub mod commands;
pub mod lifecycle;
pub mod sink;

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::info;

use crate::config::Config;
use crate::fetch::pinterest::PinterestSource;
use crate::fetch::youtube::YoutubeSource;
use crate::fetch::{Limits, MediaHttpClient};

/// A format prompt waiting for the requester's choice.
///
/// Keyed by `(chat id, prompt message id)`; the callback payload carries
/// only the format token, never the URL, so a client cannot inject a
/// different target into a pending request.
#[derive(Debug, Clone)]
pub(crate) struct PendingChoice {
    pub(crate) url: String,
}

pub(crate) type PendingChoices = DashMap<(i64, i32), PendingChoice>;

/// Immutable shared state handed to every handler.
pub struct BotContext {
    /// Startup configuration.
    pub config: Config,
    /// The configured ceilings.
    pub limits: Limits,
    /// Pinboard locator/acquirer.
    pub pinterest: PinterestSource,
    /// Video-platform acquirer.
    pub youtube: YoutubeSource,
    pub(crate) pending: PendingChoices,
}

impl BotContext {
    /// Builds the context and its long-lived collaborators from the config.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let limits = Limits {
            max_file_size: config.max_file_size,
            max_duration_secs: config.max_duration_secs,
        };
        Self {
            limits,
            pinterest: PinterestSource::new(MediaHttpClient::new()),
            youtube: YoutubeSource::new(&config.ytdlp_bin, &config.ffmpeg_bin),
            pending: DashMap::new(),
            config,
        }
    }
}

/// Runs the dispatcher until shutdown (ctrl-c).
///
/// Per-request handler errors are logged by the error handler and never
/// terminate the process.
pub async fn run(ctx: Arc<BotContext>) {
    let bot = Bot::new(ctx.config.bot_token.clone());

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<commands::Command>()
                .endpoint(commands::handle),
        )
        .branch(Update::filter_message().endpoint(lifecycle::handle_message))
        .branch(Update::filter_callback_query().endpoint(lifecycle::handle_format_choice));

    info!("dispatcher starting, waiting for messages");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "request handler failed",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
