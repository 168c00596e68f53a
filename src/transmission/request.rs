use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields requested for every `torrent-get` call.
pub const TORRENT_FIELDS: &[&str] = &["id", "name", "status", "percentDone", "totalSize"];

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, A> {
    pub method: &'a str,
    pub arguments: A,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct RpcResponse<T> {
    pub result: String,
    #[serde(default)]
    pub arguments: T,
}

#[derive(Debug, Default, Serialize)]
pub struct TorrentAdd<'a> {
    /// Magnet URI or URL of a .torrent file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<&'a str>,
    /// Base64-encoded .torrent file body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metainfo: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TorrentAdded {
    #[serde(rename = "torrent-added")]
    pub added: Option<AddedTorrent>,
    #[serde(rename = "torrent-duplicate")]
    pub duplicate: Option<AddedTorrent>,
}

#[derive(Debug, Deserialize)]
pub struct AddedTorrent {
    pub id: i64,
    pub name: String,
}

impl TorrentAdded {
    /// A duplicate is reported the same way as a fresh add.
    pub fn into_record(self) -> Option<TorrentRecord> {
        self.added.or(self.duplicate).map(|t| TorrentRecord {
            id: t.id,
            name: t.name,
            status: None,
            percent_done: None,
            total_size: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TorrentGet<'a> {
    pub fields: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Torrents {
    #[serde(default)]
    pub torrents: Vec<TorrentFields>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentFields {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub status: Option<i64>,
    pub percent_done: Option<f64>,
    pub total_size: Option<i64>,
}

impl From<TorrentFields> for TorrentRecord {
    fn from(t: TorrentFields) -> Self {
        TorrentRecord {
            id: t.id,
            name: t.name,
            status: t.status.map(TorrentStatus::from),
            percent_done: t.percent_done,
            total_size: t.total_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TorrentRemove {
    pub ids: Vec<i64>,
    #[serde(rename = "delete-local-data")]
    pub delete_local_data: bool,
}

/// `torrent-remove` answers with an empty arguments object.
#[derive(Debug, Default, Deserialize)]
pub struct Empty {}

/// A snapshot of one torrent as reported by Transmission.
///
/// Records built from an add response only carry `id` and `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentRecord {
    pub id: i64,
    pub name: String,
    pub status: Option<TorrentStatus>,
    /// Completion in `0.0..=1.0`
    pub percent_done: Option<f64>,
    /// Bytes
    pub total_size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentStatus {
    Stopped,
    QueuedToVerify,
    Verifying,
    QueuedToDownload,
    Downloading,
    QueuedToSeed,
    Seeding,
    Unknown(i64),
}

impl From<i64> for TorrentStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Stopped,
            1 => Self::QueuedToVerify,
            2 => Self::Verifying,
            3 => Self::QueuedToDownload,
            4 => Self::Downloading,
            5 => Self::QueuedToSeed,
            6 => Self::Seeding,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("Stopped"),
            Self::QueuedToVerify => f.write_str("Queued to verify"),
            Self::Verifying => f.write_str("Verifying"),
            Self::QueuedToDownload => f.write_str("Queued to download"),
            Self::Downloading => f.write_str("Downloading"),
            Self::QueuedToSeed => f.write_str("Queued to seed"),
            Self::Seeding => f.write_str("Seeding"),
            Self::Unknown(code) => write!(f, "Unknown ({code})"),
        }
    }
}
