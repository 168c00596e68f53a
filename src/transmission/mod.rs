mod client;
mod error;
pub mod request;

pub use client::{TransmissionClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result, RpcError};
pub use request::{TorrentRecord, TorrentStatus};

use async_trait::async_trait;

/// The download-manager operations the bot relies on.
#[async_trait]
pub trait TorrentManager: Send + Sync {
    async fn add_magnet(&self, magnet: &str) -> Result<TorrentRecord>;

    async fn add_file(&self, metainfo: &str) -> Result<TorrentRecord>;

    async fn list(&self) -> Result<Vec<TorrentRecord>>;

    async fn get(&self, id: i64) -> Result<TorrentRecord>;

    async fn remove(&self, id: i64, delete_data: bool) -> Result<()>;

    fn close(&self);
}

#[async_trait]
impl TorrentManager for TransmissionClient {
    async fn add_magnet(&self, magnet: &str) -> Result<TorrentRecord> {
        TransmissionClient::add_magnet(self, magnet).await
    }

    async fn add_file(&self, metainfo: &str) -> Result<TorrentRecord> {
        TransmissionClient::add_file(self, metainfo).await
    }

    async fn list(&self) -> Result<Vec<TorrentRecord>> {
        TransmissionClient::list(self).await
    }

    async fn get(&self, id: i64) -> Result<TorrentRecord> {
        TransmissionClient::get(self, id).await
    }

    async fn remove(&self, id: i64, delete_data: bool) -> Result<()> {
        TransmissionClient::remove(self, id, delete_data).await
    }

    fn close(&self) {
        TransmissionClient::close(self)
    }
}
