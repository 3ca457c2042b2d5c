//! Per-request lifecycle: classification, format election, acquisition,
//! delivery, cleanup.
//!
//! One request moves `Received -> Classified -> (AwaitingFormat | Acquiring)
//! -> Delivering -> Done`, with `Errored` reachable from every non-terminal
//! state. A failure anywhere rewrites the status message with the error's
//! text and guarantees the local file is gone; there are no retries — a
//! single failure is terminal for that request.

use std::sync::Arc;

use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::utils::html;
use tracing::{debug, info, warn};

use super::sink::TelegramSink;
use super::{BotContext, PendingChoice, PendingChoices};
use crate::classify::{Platform, classify};
use crate::deliver::deliver_and_discard;
use crate::fetch::{FetchError, MediaArtifact, MediaFormat};

const CALLBACK_VIDEO: &str = "video";
const CALLBACK_AUDIO: &str = "audio";

/// Entry point for plain text messages: classify and branch.
pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    ctx: Arc<BotContext>,
) -> anyhow::Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let text = text.trim();
    // Unknown commands fall through the command filter; ignore them here.
    if text.is_empty() || text.starts_with('/') {
        return Ok(());
    }

    match classify(text) {
        Platform::YouTube => prompt_format(&bot, &msg, &ctx, text).await,
        Platform::Pinterest => run_pinterest(&bot, &msg, &ctx, text).await,
        Platform::Unsupported => {
            let lowered = text.to_ascii_lowercase();
            let reply = if lowered.starts_with("http://") || lowered.starts_with("https://") {
                "❌ <b>Unsupported platform.</b>\n\nSupported:\n• YouTube\n• Pinterest"
            } else {
                "❌ <b>Send a valid link.</b>\n\nExample: https://youtube.com/shorts/..."
            };
            bot.send_message(msg.chat.id, reply)
                .parse_mode(ParseMode::Html)
                .await?;
            Ok(())
        }
    }
}

/// `Classified -> AwaitingFormat`: present the two choices and suspend.
///
/// The URL is held server-side, keyed by the prompt message; the callback
/// payload is only the format token. An abandoned prompt never resumes.
async fn prompt_format(
    bot: &Bot,
    msg: &Message,
    ctx: &BotContext,
    url: &str,
) -> anyhow::Result<()> {
    let keyboard = InlineKeyboardMarkup::new([[
        InlineKeyboardButton::callback("🎬 Video (MP4)", CALLBACK_VIDEO),
        InlineKeyboardButton::callback("🎵 Audio (MP3)", CALLBACK_AUDIO),
    ]]);
    let prompt = bot
        .send_message(
            msg.chat.id,
            "📺 <b>YouTube link detected.</b>\nPick a format:",
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;

    ctx.pending.insert(
        (msg.chat.id.0, prompt.id.0),
        PendingChoice {
            url: url.to_string(),
        },
    );
    debug!(chat = msg.chat.id.0, prompt = prompt.id.0, "awaiting format choice");
    Ok(())
}

/// Callback entry point: resumes a suspended request at `Acquiring`.
pub(crate) async fn handle_format_choice(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<BotContext>,
) -> anyhow::Result<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message.as_ref() else {
        // Prompt too old for the transport to reference; nothing to resume.
        return Ok(());
    };
    let chat_id = message.chat.id;
    let prompt_id = message.id;

    // Only the two issued tokens resume a request; anything else did not
    // come from our keyboard and cancels the prompt.
    let Some(format) = parse_format_token(q.data.as_deref()) else {
        warn!(chat = chat_id.0, prompt = prompt_id.0, data = ?q.data, "unrecognized callback payload");
        ctx.pending.remove(&(chat_id.0, prompt_id.0));
        bot.edit_message_text(
            chat_id,
            prompt_id,
            "This prompt has expired. Send the link again.",
        )
        .await?;
        return Ok(());
    };

    let Some(pending) = take_pending(&ctx.pending, chat_id, prompt_id) else {
        warn!(chat = chat_id.0, prompt = prompt_id.0, "no pending request for this prompt");
        bot.edit_message_text(
            chat_id,
            prompt_id,
            "This prompt has expired. Send the link again.",
        )
        .await?;
        return Ok(());
    };

    bot.edit_message_text(
        chat_id,
        prompt_id,
        format!(
            "⏳ <b>Downloading {} from YouTube…</b>\nThis can take 20–40 seconds.",
            format.label()
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    info!(url = %pending.url, format = format.label(), "acquiring video-platform media");
    let result = ctx
        .youtube
        .acquire(&pending.url, format, &ctx.config.download_dir, &ctx.limits)
        .await;
    finish(&bot, chat_id, prompt_id, result, format).await
}

/// `Classified -> Acquiring` for pinboard links: no format election.
async fn run_pinterest(
    bot: &Bot,
    msg: &Message,
    ctx: &BotContext,
    url: &str,
) -> anyhow::Result<()> {
    let status = bot
        .send_message(
            msg.chat.id,
            "⏳ <b>Downloading Pinterest video…</b>\nThis can take 15–30 seconds.",
        )
        .parse_mode(ParseMode::Html)
        .await?;

    info!(url, "acquiring pinboard media");
    let result = ctx
        .pinterest
        .acquire(url, &ctx.config.download_dir, ctx.limits.max_file_size)
        .await;
    finish(bot, msg.chat.id, status.id, result, MediaFormat::Video).await
}

/// `Acquiring -> Delivering -> Done`, or `-> Errored` from either step.
///
/// On success the status message is deleted; on failure it is rewritten with
/// the error text. Either way no local file remains once this returns.
async fn finish(
    bot: &Bot,
    chat_id: ChatId,
    status_id: MessageId,
    result: Result<MediaArtifact, FetchError>,
    format: MediaFormat,
) -> anyhow::Result<()> {
    let artifact = match result {
        Ok(artifact) => artifact,
        Err(e) => return report_error(bot, chat_id, status_id, &e).await,
    };

    let sink = TelegramSink::new(bot.clone(), chat_id);
    match deliver_and_discard(&sink, artifact, format).await {
        Ok(()) => {
            bot.delete_message(chat_id, status_id).await?;
            debug!(chat = chat_id.0, "request done");
            Ok(())
        }
        Err(e) => report_error(bot, chat_id, status_id, &e).await,
    }
}

/// Maps a callback payload token to the elected format. Anything but the
/// two issued tokens is `None`.
fn parse_format_token(data: Option<&str>) -> Option<MediaFormat> {
    match data {
        Some(CALLBACK_VIDEO) => Some(MediaFormat::Video),
        Some(CALLBACK_AUDIO) => Some(MediaFormat::Audio),
        _ => None,
    }
}

/// Takes the pending request for a prompt, at most once: the entry is
/// removed, so a second tap on the same prompt finds nothing.
fn take_pending(
    pending: &PendingChoices,
    chat_id: ChatId,
    prompt_id: MessageId,
) -> Option<PendingChoice> {
    pending
        .remove(&(chat_id.0, prompt_id.0))
        .map(|(_, choice)| choice)
}

/// The `Errored` terminal state: one edited status message, short
/// diagnostic, nothing internal.
async fn report_error(
    bot: &Bot,
    chat_id: ChatId,
    status_id: MessageId,
    error: &FetchError,
) -> anyhow::Result<()> {
    warn!(chat = chat_id.0, %error, "request failed");
    bot.edit_message_text(
        chat_id,
        status_id,
        format!("❌ <b>Error:</b>\n{}", html::escape(&error.to_string())),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens_map_to_their_formats() {
        assert_eq!(parse_format_token(Some("video")), Some(MediaFormat::Video));
        assert_eq!(parse_format_token(Some("audio")), Some(MediaFormat::Audio));
    }

    #[test]
    fn test_unexpected_payload_elects_no_format() {
        assert_eq!(parse_format_token(Some("mp4")), None);
        assert_eq!(parse_format_token(Some("")), None);
        assert_eq!(parse_format_token(None), None);
    }

    #[test]
    fn test_pending_request_resumes_at_most_once() {
        let pending = PendingChoices::new();
        pending.insert(
            (7, 42),
            PendingChoice {
                url: "https://youtu.be/abc".to_string(),
            },
        );

        let first = take_pending(&pending, ChatId(7), MessageId(42));
        assert_eq!(first.map(|c| c.url).as_deref(), Some("https://youtu.be/abc"));
        // The first take consumed the entry.
        assert!(take_pending(&pending, ChatId(7), MessageId(42)).is_none());
    }

    #[test]
    fn test_pending_requests_are_scoped_to_their_prompt() {
        let pending = PendingChoices::new();
        pending.insert(
            (7, 42),
            PendingChoice {
                url: "https://youtu.be/abc".to_string(),
            },
        );

        assert!(take_pending(&pending, ChatId(7), MessageId(43)).is_none());
        assert!(take_pending(&pending, ChatId(8), MessageId(42)).is_none());
        assert!(take_pending(&pending, ChatId(7), MessageId(42)).is_some());
    }
}
