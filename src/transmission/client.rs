use super::{
    error::{Error, Result, RpcError},
    request::{self, TorrentRecord},
};
use crate::config::TransmissionConfig;
use anyhow::Context;
use reqwest::{header::HeaderValue, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
    time::Duration,
};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Transmission RPC client.
///
/// Safe to share between tasks; the only mutable state is the session id
/// Transmission hands out on a 409 response.
pub struct TransmissionClient {
    inner: Client,
    url: Url,
    auth: Option<(String, String)>,
    session_id: RwLock<Option<HeaderValue>>,
    closed: AtomicBool,
}

impl TransmissionClient {
    pub fn new(config: &TransmissionConfig) -> anyhow::Result<Self> {
        let url = Url::parse(&config.url)
            .with_context(|| format!("Invalid transmission url {}", config.url))?;
        let inner = reqwest::ClientBuilder::new()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Cannot build http client")?;
        let auth = if !config.username.is_empty() && !config.password.is_empty() {
            Some((config.username.clone(), config.password.clone()))
        } else {
            None
        };
        Ok(Self {
            inner,
            url,
            auth,
            session_id: RwLock::new(None),
            closed: AtomicBool::new(false),
        })
    }

    async fn post<B: Serialize>(&self, body: &B) -> Result<reqwest::Response, RpcError> {
        let mut req = self.inner.post(self.url.clone()).json(body);
        if let Some((username, password)) = &self.auth {
            req = req.basic_auth(username, Some(password));
        }
        let session_id = self
            .session_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(session_id) = session_id {
            req = req.header(SESSION_ID_HEADER, session_id);
        }
        Ok(req.send().await?)
    }

    /// One RPC round trip, including the session id handshake.
    async fn rpc<A, T>(&self, method: &str, arguments: A) -> Result<T, RpcError>
    where
        A: Serialize,
        T: DeserializeOwned + Default,
    {
        if self.closed.load(Ordering::Acquire) {
            return Err(RpcError::Closed);
        }
        let body = request::RpcRequest { method, arguments };
        let mut response = self.post(&body).await?;
        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .cloned()
                .ok_or(RpcError::MissingSessionId)?;
            debug!("transmission session id refreshed");
            *self.session_id.write().unwrap_or_else(|e| e.into_inner()) = Some(session_id);
            response = self.post(&body).await?;
        }
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status));
        }
        let envelope = response.json::<request::RpcResponse<T>>().await?;
        if envelope.result != "success" {
            return Err(RpcError::Rpc(envelope.result));
        }
        trace!("rpc {method} ok");
        Ok(envelope.arguments)
    }

    async fn add(&self, args: request::TorrentAdd<'_>) -> Result<TorrentRecord> {
        let added: request::TorrentAdded = self
            .rpc("torrent-add", args)
            .await
            .map_err(Error::AddFailed)?;
        added.into_record().ok_or(Error::UnexpectedResponse)
    }

    pub async fn add_magnet(&self, magnet: &str) -> Result<TorrentRecord> {
        self.add(request::TorrentAdd {
            filename: Some(magnet),
            metainfo: None,
        })
        .await
    }

    /// `metainfo` is the base64-encoded body of a .torrent file.
    pub async fn add_file(&self, metainfo: &str) -> Result<TorrentRecord> {
        self.add(request::TorrentAdd {
            filename: None,
            metainfo: Some(metainfo),
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<TorrentRecord>> {
        let torrents: request::Torrents = self
            .rpc(
                "torrent-get",
                request::TorrentGet {
                    fields: request::TORRENT_FIELDS,
                    ids: None,
                },
            )
            .await
            .map_err(Error::ListFailed)?;
        Ok(torrents.torrents.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: i64) -> Result<TorrentRecord> {
        let torrents: request::Torrents = self
            .rpc(
                "torrent-get",
                request::TorrentGet {
                    fields: request::TORRENT_FIELDS,
                    ids: Some(vec![id]),
                },
            )
            .await
            .map_err(Error::GetFailed)?;
        torrents
            .torrents
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or(Error::NotFound)
    }

    pub async fn remove(&self, id: i64, delete_data: bool) -> Result<()> {
        let _: request::Empty = self
            .rpc(
                "torrent-remove",
                request::TorrentRemove {
                    ids: vec![id],
                    delete_local_data: delete_data,
                },
            )
            .await
            .map_err(Error::RemoveFailed)?;
        Ok(())
    }

    /// Every call after this fails with [`RpcError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            warn!("transmission client closed twice");
            return;
        }
        self.session_id
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        info!("transmission client closed");
    }
}
