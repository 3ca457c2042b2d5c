//! Telegram implementation of the delivery sink.

use async_trait::async_trait;
use teloxide::payloads::{SendAudioSetters, SendVideoSetters};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use teloxide::utils::html;

use crate::deliver::DeliverySink;
use crate::fetch::{FetchError, MediaArtifact, MediaFormat};
use crate::units::{format_duration, format_size};

/// Sends finished artifacts into one chat.
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramSink {
    pub(crate) fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

/// Caption: title, human-readable size, duration when known.
fn caption(artifact: &MediaArtifact, format: MediaFormat) -> String {
    let icon = match format {
        MediaFormat::Video => "🎬",
        MediaFormat::Audio => "🎵",
    };
    let mut caption = format!(
        "{icon} <b>{}</b>\n📦 {}",
        html::escape(&artifact.title),
        format_size(artifact.size_bytes)
    );
    if artifact.duration_secs > 0 {
        caption.push_str(&format!("\n⏱ {}", format_duration(artifact.duration_secs)));
    }
    caption
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn deliver(
        &self,
        artifact: &MediaArtifact,
        format: MediaFormat,
    ) -> Result<(), FetchError> {
        let file = InputFile::file(artifact.path.clone());
        let caption = caption(artifact, format);
        let sent = match format {
            MediaFormat::Video => self
                .bot
                .send_video(self.chat_id, file)
                .caption(caption)
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ()),
            MediaFormat::Audio => self
                .bot
                .send_audio(self.chat_id, file)
                .caption(caption)
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ()),
        };
        // The transport's own failure (e.g. file too large for it) becomes a
        // distinct delivery error, never an unhandled fault.
        sent.map_err(|e| FetchError::send(e.to_string()))
    }
}
