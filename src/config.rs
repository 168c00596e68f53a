use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TRANSMISSION_URL: &str = "http://localhost:9091/transmission/rpc";

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub transmission: TransmissionConfig,
    pub log: LogConfig,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather
    pub token: String,
    /// Telegram user ids allowed to talk to the bot
    pub allowed_users: Vec<u64>,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TransmissionConfig {
    /// RPC endpoint. Example: `http://localhost:9091/transmission/rpc`
    pub url: String,
    /// Basic auth is only sent when both username and password are set
    pub username: String,
    pub password: String,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRANSMISSION_URL.to_string(),
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One of debug, info, warn, error
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// `RUST_LOG` value for the configured level, keeping chatty dependencies quiet.
    pub fn filter(&self) -> String {
        let level = match self.level.as_str() {
            "debug" | "info" | "warn" | "error" => self.level.as_str(),
            _ => "info",
        };
        format!("{level},reqwest=warn,hyper=warn,rustls=warn,teloxide=warn")
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("telegram.token is required")]
    MissingToken,

    #[error("telegram.allowed_users is required (at least one user ID)")]
    MissingAllowedUsers,

    #[error("transmission.url is required")]
    MissingUrl,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.telegram.allowed_users.is_empty() {
            return Err(ConfigError::MissingAllowedUsers);
        }
        if self.transmission.url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        Ok(())
    }
}

/// Places searched when no config path is given, in order.
fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config.toml")];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(Path::new(&home).join(".transmission-bot").join("config.toml"));
    }
    paths.push(PathBuf::from("/etc/transmission-bot/config.toml"));
    paths
}

/// The config file to read: `explicit` when given, else the first default
/// location that exists. `None` means run on defaults.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_paths().into_iter().find(|p| p.is_file()),
    }
}

/// Load the config file at `path`, which must exist.
pub async fn load(path: &Path) -> Result<Config> {
    let config_str = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read config path {}", path.display()))?;
    parse(&config_str)
}

pub fn parse(s: &str) -> Result<Config> {
    toml::from_str::<Config>(s).context("Config file corrupted")
}
