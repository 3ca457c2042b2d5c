//! Informational commands. None of these touch the acquisition pipeline.

use std::sync::Arc;

use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use super::BotContext;
use crate::units::{format_duration, format_size};

/// The static command surface.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    /// Greeting, supported platforms and limits.
    #[command(description = "what this bot does")]
    Start,
    /// Usage help.
    #[command(description = "how to use it")]
    Help,
    /// Liveness check.
    #[command(description = "check the bot is alive")]
    Ping,
    /// Current limits and storage state.
    #[command(description = "limits and storage state")]
    Status,
}

pub(crate) async fn handle(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> anyhow::Result<()> {
    let text = match cmd {
        Command::Start => start_text(&ctx),
        Command::Help => help_text(),
        Command::Ping => "🏓 <b>Alive.</b>".to_string(),
        Command::Status => status_text(&ctx).await,
    };
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

fn start_text(ctx: &BotContext) -> String {
    format!(
        "🎬 <b>clipfetch</b>\n\n\
         Send a link, get the media back.\n\n\
         <b>Supported:</b>\n\
         • YouTube — video (MP4) or audio (MP3)\n\
         • Pinterest — video\n\n\
         <b>Limits:</b>\n\
         • Max size: {}\n\
         • Max duration: {}\n\n\
         <b>Examples:</b>\n\
         https://youtube.com/shorts/...\n\
         https://youtu.be/...\n\
         https://pin.it/...\n\n\
         Send a link 👇",
        format_size(ctx.limits.max_file_size),
        format_duration(ctx.limits.max_duration_secs),
    )
}

fn help_text() -> String {
    format!(
        "<b>How to use:</b>\n\
         1. Send a YouTube or Pinterest link\n\
         2. For YouTube, pick video or audio\n\
         3. Receive the file\n\n\
         <b>If it does not work:</b>\n\
         • Check the link is public\n\
         • Shorter videos download faster\n\n\
         {}",
        Command::descriptions()
    )
}

async fn status_text(ctx: &BotContext) -> String {
    let files = count_files(ctx).await;
    format!(
        "<b>Status</b>\n\n\
         📁 Files in storage: {files}\n\
         💾 Max file size: {}\n\
         ⏱ Max duration: {}\n\
         🧹 Retention: {} min sweep, {} min max age",
        format_size(ctx.limits.max_file_size),
        format_duration(ctx.limits.max_duration_secs),
        ctx.config.sweep_interval.as_secs() / 60,
        ctx.config.retention.as_secs() / 60,
    )
}

async fn count_files(ctx: &BotContext) -> usize {
    let Ok(mut entries) = tokio::fs::read_dir(&ctx.config.download_dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Ok(Some(_)) = entries.next_entry().await {
        count += 1;
    }
    count
}
