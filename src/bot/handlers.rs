use super::{
    dispatch::Command,
    format,
    transport::{Attachment, InboundMessage},
    Relay,
};
use crate::transmission::Error;
use base64::{engine::general_purpose::STANDARD, Engine};

/// Second `/remove` argument asking for the downloaded files to go too.
pub const DELETE_DATA_KEYWORD: &str = "data";

const HELP: &str = "Available commands:

/start - Start the bot
/help - Show this help message
/list - List all torrents
/remove <id> - Remove torrent by ID
/remove <id> data - Remove torrent and delete data

You can also:
• Send a .torrent file
• Send a magnet link";

const REMOVE_USAGE: &str = "Usage: /remove <id> [data]\n\nAdd 'data' to also remove downloaded data.";

#[derive(Debug, PartialEq, Eq)]
pub enum RemoveArgsError {
    Empty,
    InvalidId,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RemoveArgs {
    pub id: i64,
    pub delete_data: bool,
}

pub fn parse_remove_args(args: &str) -> Result<RemoveArgs, RemoveArgsError> {
    let mut tokens = args.split_whitespace();
    let id = tokens.next().ok_or(RemoveArgsError::Empty)?;
    let id = id.parse::<i64>().map_err(|_| RemoveArgsError::InvalidId)?;
    let delete_data = tokens.next() == Some(DELETE_DATA_KEYWORD);
    Ok(RemoveArgs { id, delete_data })
}

impl Relay {
    pub(super) async fn on_command(&self, msg: &InboundMessage, cmd: Command, args: &str) {
        match cmd {
            Command::Start => self.on_start(msg).await,
            Command::Help => self.reply(msg, HELP).await,
            Command::List => self.on_list(msg).await,
            Command::Remove => self.on_remove(msg, args).await,
        }
    }

    async fn on_start(&self, msg: &InboundMessage) {
        let text = format!(
            "Welcome, {}!\n\n\
             I can help you manage your Transmission downloads.\n\n\
             Send me a .torrent file or a magnet link to add a new torrent.\n\n\
             Use /help to see all available commands.",
            msg.sender.first_name
        );
        self.reply(msg, &text).await;
    }

    async fn on_list(&self, msg: &InboundMessage) {
        let torrents = match self.manager.list().await {
            Ok(torrents) => torrents,
            Err(e) => {
                error!("failed to list torrents: {e:?}");
                self.reply(msg, &format!("Failed to list torrents: {e}"))
                    .await;
                return;
            }
        };
        if torrents.is_empty() {
            self.reply(msg, "No torrents found").await;
            return;
        }

        let header = format!("Torrents ({}):", torrents.len());
        self.reply_lines(
            msg,
            std::iter::once(header).chain(torrents.iter().map(format::torrent_line)),
        )
        .await;
    }

    async fn on_remove(&self, msg: &InboundMessage, args: &str) {
        let RemoveArgs { id, delete_data } = match parse_remove_args(args) {
            Ok(args) => args,
            Err(RemoveArgsError::Empty) => {
                self.reply(msg, REMOVE_USAGE).await;
                return;
            }
            Err(RemoveArgsError::InvalidId) => {
                self.reply(msg, "Invalid torrent ID. Please provide a numeric ID.")
                    .await;
                return;
            }
        };

        let torrent = match self.manager.get(id).await {
            Ok(torrent) => torrent,
            Err(Error::NotFound) => {
                self.reply(msg, &format!("Torrent {id} not found")).await;
                return;
            }
            Err(e) => {
                error!("failed to get torrent {id}: {e:?}");
                self.reply(msg, &format!("Failed to get torrent: {e}")).await;
                return;
            }
        };

        if let Err(e) = self.manager.remove(id, delete_data).await {
            error!("failed to remove torrent {id}: {e:?}");
            self.reply(msg, &format!("Failed to remove torrent: {e}"))
                .await;
            return;
        }
        info!(
            "torrent {id} ({}) removed by user {}, delete_data = {delete_data}",
            torrent.name, msg.sender.id
        );

        let text = if delete_data {
            format!("Torrent \"{}\" removed with data", torrent.name)
        } else {
            format!("Torrent \"{}\" removed", torrent.name)
        };
        self.reply(msg, &text).await;
    }

    pub(super) async fn on_torrent_file(&self, msg: &InboundMessage, attachment: &Attachment) {
        let data = match self.transport.download(attachment).await {
            Ok(data) => data,
            Err(e) => {
                error!("failed to download file {}: {e:?}", attachment.file_id);
                self.reply(msg, "Failed to download file").await;
                return;
            }
        };
        debug!("downloaded torrent file, {} bytes", data.len());

        let torrent = match self.manager.add_file(&STANDARD.encode(&data)).await {
            Ok(torrent) => torrent,
            Err(e) => {
                error!("failed to add torrent: {e:?}");
                self.reply(msg, &format!("Failed to add torrent: {e}")).await;
                return;
            }
        };
        info!(
            "torrent {} ({}) added by user {}",
            torrent.id, torrent.name, msg.sender.id
        );
        let lines = [
            "Torrent added:".to_string(),
            format!("ID: {}", torrent.id),
            format!("Name: {}", torrent.name),
        ];
        self.reply_lines(msg, lines).await;
    }

    pub(super) async fn on_magnets(&self, msg: &InboundMessage, magnets: &[&str]) {
        let results =
            futures::future::join_all(magnets.iter().map(|m| self.manager.add_magnet(m))).await;
        let header = format!("Added {} torrent(s):", magnets.len());
        let lines = results
            .into_iter()
            .map(|r| match r {
                Ok(torrent) => {
                    info!(
                        "torrent {} ({}) added by user {}",
                        torrent.id, torrent.name, msg.sender.id
                    );
                    format!("ID: {} - {}", torrent.id, torrent.name)
                }
                Err(e) => {
                    error!("failed to add magnet: {e:?}");
                    format!("Failed: {e}")
                }
            });
        self.reply_lines(msg, std::iter::once(header).chain(lines))
            .await;
    }

    /// Reply with as many messages as the lines need.
    async fn reply_lines<I>(&self, msg: &InboundMessage, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for chunk in format::chunk_lines(lines, format::MAX_MESSAGE_LEN) {
            self.reply(msg, &chunk).await;
        }
    }
}
