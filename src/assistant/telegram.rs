//! Telegram client using teloxide.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    FileId, KeyboardButton, KeyboardMarkup, MessageId, ReplyParameters,
};
use tracing::{info, warn};

/// Telegram API client. Replies are plain text; the model output already
/// carries its own emoji formatting.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<i64, String> {
        let chat_id = ChatId(chat_id);
        let mut request = self.bot.send_message(chat_id, text);

        if let Some(msg_id) = reply_to_message_id {
            let reply_params = ReplyParameters::new(MessageId(msg_id as i32));
            request = request.reply_parameters(reply_params);
        }

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }

    /// Send a message with a one-time reply keyboard (the language menu).
    pub async fn send_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[&str],
    ) -> Result<i64, String> {
        let chat_id = ChatId(chat_id);

        // Two buttons per row keeps the menu compact on phones.
        let rows: Vec<Vec<KeyboardButton>> = buttons
            .chunks(2)
            .map(|pair| pair.iter().map(|b| KeyboardButton::new(b.to_string())).collect())
            .collect();
        let keyboard = KeyboardMarkup::new(rows)
            .one_time_keyboard()
            .resize_keyboard();

        self.bot
            .send_message(chat_id, text)
            .reply_markup(keyboard)
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| {
                let msg = format!("Failed to send keyboard: {e}");
                warn!("{}", msg);
                msg
            })
    }

    /// Download a voice message by file_id. Telegram voice is OGG Opus.
    pub async fn download_voice(&self, file_id: &str) -> Result<Vec<u8>, String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        info!("📥 Downloaded voice message ({} bytes)", data.len());
        Ok(data)
    }
}
