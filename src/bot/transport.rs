use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::{
    net::Download,
    payloads::SendMessageSetters,
    prelude::*,
    types::{MessageId, ReplyParameters},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: Option<String>,
}

/// The parts of a chat message the bot looks at.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub message_id: i32,
    pub chat_id: i64,
    pub sender: Sender,
    /// Message text. Captions are not read, so a document is never a command.
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl InboundMessage {
    /// `None` for messages without a sender, e.g. channel posts.
    pub fn from_telegram(msg: &Message) -> Option<Self> {
        let from = msg.from.as_ref()?;
        let attachment = msg.document().map(|doc| Attachment {
            file_id: doc.file.id.clone(),
            file_name: doc.file_name.clone(),
        });
        Some(Self {
            message_id: msg.id.0,
            chat_id: msg.chat.id.0,
            sender: Sender {
                id: from.id.0,
                first_name: from.first_name.clone(),
                username: from.username.clone(),
            },
            text: msg.text().map(str::to_string),
            attachment,
        })
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `text` to the chat of `to`, threaded as a reply.
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()>;

    /// Fetch the full contents of an attachment.
    async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>>;
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(to.chat_id), text)
            .reply_parameters(
                ReplyParameters::new(MessageId(to.message_id)).allow_sending_without_reply(),
            )
            .await
            .context("send message failed")?;
        Ok(())
    }

    async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        let file = self
            .bot
            .get_file(attachment.file_id.as_str())
            .await
            .context("get file failed")?;
        debug!("downloading {}", file.path);
        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .context("download file failed")?;
        Ok(data)
    }
}
