use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a single RPC round trip.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("409 response without a session id")]
    MissingSessionId,

    #[error("transmission replied: {0}")]
    Rpc(String),

    #[error("client closed")]
    Closed,
}

/// Outcome of a failed download-manager operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("adding torrent: {0}")]
    AddFailed(#[source] RpcError),

    #[error("listing torrents: {0}")]
    ListFailed(#[source] RpcError),

    #[error("getting torrent: {0}")]
    GetFailed(#[source] RpcError),

    #[error("removing torrent: {0}")]
    RemoveFailed(#[source] RpcError),

    #[error("torrent not found")]
    NotFound,

    #[error("unexpected response: no torrent added or duplicate")]
    UnexpectedResponse,
}
