use super::transport::{Attachment, InboundMessage};
use regex::Regex;
use std::str::FromStr;

lazy_static::lazy_static! {
    static ref MAGNET_RE: Regex =
        Regex::new(r"magnet:\?xt=urn:[a-zA-Z0-9]+:[a-zA-Z0-9]+[^\s]*").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    List,
    Remove,
}

impl Command {
    /// Entries for the Telegram command menu.
    pub const MENU: &'static [(&'static str, &'static str)] = &[
        ("start", "Start the bot"),
        ("help", "Show help message"),
        ("list", "List all torrents"),
        ("remove", "Remove torrent by ID"),
    ];
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "help" => Ok(Self::Help),
            "list" => Ok(Self::List),
            "remove" => Ok(Self::Remove),
            _ => Err(()),
        }
    }
}

/// What to do with one inbound message.
#[derive(Debug, PartialEq)]
pub enum Dispatch<'a> {
    /// A known command and its raw, trimmed argument string
    Command(Command, &'a str),
    UnknownCommand(&'a str),
    Torrent(&'a Attachment),
    /// An attachment that is not a .torrent file
    Unsupported,
    Magnets(Vec<&'a str>),
    Ignore,
}

/// Split `/name@bot args` into `("name", "args")`.
///
/// Only names Telegram would mark as a bot command count, so `/path/to` is
/// plain text.
pub fn parse_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let name = head.split_once('@').map_or(head, |(name, _bot)| name);
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name, args.trim()))
}

pub fn find_magnets(text: &str) -> Vec<&str> {
    MAGNET_RE.find_iter(text).map(|m| m.as_str()).collect()
}

fn is_torrent_file(attachment: &Attachment) -> bool {
    attachment
        .file_name
        .as_deref()
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(".torrent"))
}

pub fn classify(msg: &InboundMessage) -> Dispatch<'_> {
    let text = msg.text.as_deref().unwrap_or("");

    if let Some((name, args)) = parse_command(text) {
        return match name.parse::<Command>() {
            Ok(cmd) => Dispatch::Command(cmd, args),
            Err(()) => Dispatch::UnknownCommand(name),
        };
    }

    if let Some(attachment) = &msg.attachment {
        return if is_torrent_file(attachment) {
            Dispatch::Torrent(attachment)
        } else {
            Dispatch::Unsupported
        };
    }

    let magnets = find_magnets(text);
    if magnets.is_empty() {
        Dispatch::Ignore
    } else {
        Dispatch::Magnets(magnets)
    }
}
