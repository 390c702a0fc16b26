use async_trait::async_trait;
use teloxide::prelude::*;
use thiserror::Error;

use crate::reminder::Reminder;
use crate::scheduling::delivery::DeliveryChannel;

#[derive(Debug, Error)]
pub enum TelegramDeliveryError {
    #[error("reminder destination {0:?} is not a Telegram chat id")]
    InvalidChatId(String),

    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
}

/// Sends fired reminders back to the chat they were created in. The
/// reminder's `channel` field holds the chat id as a string.
pub struct TelegramDeliveryChannel {
    bot: Bot,
}

impl TelegramDeliveryChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl DeliveryChannel for TelegramDeliveryChannel {
    async fn deliver(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let chat_id = reminder
            .channel
            .parse::<i64>()
            .map_err(|_| TelegramDeliveryError::InvalidChatId(reminder.channel.clone()))?;

        self.bot
            .send_message(
                ChatId(chat_id),
                format!("🚨 {}: {}", reminder.who, reminder.what),
            )
            .await
            .map_err(TelegramDeliveryError::Telegram)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn rejects_destinations_that_are_not_chat_ids() {
        let channel = TelegramDeliveryChannel::new(Bot::new("123:unused"));
        let reminder = Reminder::new("ana", "water the plants", "#mathematics", Utc::now());

        let error = channel.deliver(&reminder).await.unwrap_err();

        assert!(error.to_string().contains("not a Telegram chat id"));
    }
}
