use crate::transmission::TorrentManager;
use std::sync::Arc;

pub mod access;
pub mod dispatch;
pub mod format;
mod handlers;
pub mod transport;

pub use access::AccessGate;
pub use dispatch::{Command, Dispatch};
pub use handlers::{parse_remove_args, RemoveArgs, RemoveArgsError, DELETE_DATA_KEYWORD};
pub use transport::{InboundMessage, TelegramTransport, Transport};

/// Routes chat messages to the download manager and answers back.
///
/// Cheap to clone; one clone is moved into every per-message task.
#[derive(Clone)]
pub struct Relay {
    manager: Arc<dyn TorrentManager>,
    transport: Arc<dyn Transport>,
    gate: Arc<AccessGate>,
}

impl Relay {
    pub fn new(
        manager: Arc<dyn TorrentManager>,
        transport: Arc<dyn Transport>,
        gate: AccessGate,
    ) -> Self {
        Self {
            manager,
            transport,
            gate: Arc::new(gate),
        }
    }

    /// Handle one inbound message from start to finish.
    pub async fn handle(&self, msg: InboundMessage) {
        if !self.gate.is_allowed(msg.sender.id) {
            warn!(
                "unauthorized access attempt, user_id = {}, username = {:?}",
                msg.sender.id, msg.sender.username
            );
            return;
        }
        debug!(
            "received message, user_id = {}, text = {:?}, has_document = {}",
            msg.sender.id,
            msg.text,
            msg.attachment.is_some()
        );

        match dispatch::classify(&msg) {
            Dispatch::Command(cmd, args) => self.on_command(&msg, cmd, args).await,
            Dispatch::UnknownCommand(name) => {
                debug!("unknown command /{name}");
                self.reply(&msg, "Unknown command. Use /help to see available commands.")
                    .await
            }
            Dispatch::Torrent(attachment) => self.on_torrent_file(&msg, attachment).await,
            Dispatch::Unsupported => self.reply(&msg, "Please send a .torrent file").await,
            Dispatch::Magnets(magnets) => self.on_magnets(&msg, &magnets).await,
            Dispatch::Ignore => trace!("nothing to do for message {}", msg.message_id),
        }
    }

    /// Send failures only get logged; there is nobody else to tell.
    async fn reply(&self, msg: &InboundMessage, text: &str) {
        if let Err(e) = self.transport.reply(msg, text).await {
            error!("failed to send reply to chat {}: {e:?}", msg.chat_id);
        }
    }
}
