use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Command line flags. Every flag can also be set through a `TB_*`
/// environment variable and takes precedence over the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "transmission-bot", version)]
#[command(about = "Telegram bot for the Transmission torrent client")]
#[command(long_about = "A Telegram bot that manages your Transmission downloads. \
Send torrent files or magnet links to add new downloads, list active torrents, \
and remove completed ones.")]
pub struct Cli {
    /// Config file (default: ./config.toml)
    #[arg(long, env = "TB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, env = "TB_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TB_TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Allowed Telegram user IDs, comma separated
    #[arg(long, env = "TB_TELEGRAM_ALLOWED_USERS", value_delimiter = ',')]
    pub telegram_allowed_users: Vec<u64>,

    /// Transmission RPC URL
    #[arg(long, env = "TB_TRANSMISSION_URL")]
    pub transmission_url: Option<String>,

    /// Transmission username
    #[arg(long, env = "TB_TRANSMISSION_USERNAME")]
    pub transmission_username: Option<String>,

    /// Transmission password
    #[arg(long, env = "TB_TRANSMISSION_PASSWORD", hide_env_values = true)]
    pub transmission_password: Option<String>,
}

impl Cli {
    pub fn apply(self, config: &mut Config) {
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(token) = self.telegram_token {
            config.telegram.token = token;
        }
        if !self.telegram_allowed_users.is_empty() {
            config.telegram.allowed_users = self.telegram_allowed_users;
        }
        if let Some(url) = self.transmission_url {
            config.transmission.url = url;
        }
        if let Some(username) = self.transmission_username {
            config.transmission.username = username;
        }
        if let Some(password) = self.transmission_password {
            config.transmission.password = password;
        }
    }
}
