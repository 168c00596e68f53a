use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use transmission_bot::{
    bot::{
        format::{text_len, MAX_MESSAGE_LEN},
        transport::{Attachment, Sender},
        AccessGate, InboundMessage, Relay, Transport,
    },
    transmission::{Error, RpcError, TorrentManager, TorrentRecord, TorrentStatus},
};

const OWNER: u64 = 1;

#[derive(Default)]
struct FakeManager {
    torrents: Vec<TorrentRecord>,
    failing_magnets: HashSet<String>,
    fail_add_file: bool,
    fail_list: bool,
    fail_get: bool,
    fail_remove: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeManager {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TorrentManager for FakeManager {
    async fn add_magnet(&self, magnet: &str) -> transmission_bot::transmission::Result<TorrentRecord> {
        self.record(format!("add_magnet {magnet}"));
        if self.failing_magnets.contains(magnet) {
            return Err(Error::AddFailed(RpcError::Rpc("invalid magnet".to_string())));
        }
        Ok(TorrentRecord {
            id: 100,
            name: "from magnet".to_string(),
            status: None,
            percent_done: None,
            total_size: None,
        })
    }

    async fn add_file(&self, metainfo: &str) -> transmission_bot::transmission::Result<TorrentRecord> {
        self.record(format!("add_file {metainfo}"));
        if self.fail_add_file {
            return Err(Error::AddFailed(RpcError::Rpc("invalid or corrupt torrent file".to_string())));
        }
        Ok(TorrentRecord {
            id: 200,
            name: "from file".to_string(),
            status: None,
            percent_done: None,
            total_size: None,
        })
    }

    async fn list(&self) -> transmission_bot::transmission::Result<Vec<TorrentRecord>> {
        self.record("list".to_string());
        if self.fail_list {
            return Err(Error::ListFailed(RpcError::Rpc("unauthorized".to_string())));
        }
        Ok(self.torrents.clone())
    }

    async fn get(&self, id: i64) -> transmission_bot::transmission::Result<TorrentRecord> {
        self.record(format!("get {id}"));
        if self.fail_get {
            return Err(Error::GetFailed(RpcError::Rpc("timed out".to_string())));
        }
        self.torrents
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn remove(&self, id: i64, delete_data: bool) -> transmission_bot::transmission::Result<()> {
        self.record(format!("remove {id} {delete_data}"));
        if self.fail_remove {
            return Err(Error::RemoveFailed(RpcError::Rpc("busy".to_string())));
        }
        Ok(())
    }

    fn close(&self) {}
}

#[derive(Default)]
struct FakeTransport {
    /// `None` makes downloads fail
    file: Option<Vec<u8>>,
    replies: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn reply(&self, _to: &InboundMessage, text: &str) -> anyhow::Result<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn download(&self, _attachment: &Attachment) -> anyhow::Result<Vec<u8>> {
        self.file.clone().ok_or_else(|| anyhow::anyhow!("network down"))
    }
}

fn relay(manager: &Arc<FakeManager>, transport: &Arc<FakeTransport>) -> Relay {
    Relay::new(
        manager.clone(),
        transport.clone(),
        AccessGate::new([OWNER]),
    )
}

fn text_from(user: u64, text: &str) -> InboundMessage {
    InboundMessage {
        message_id: 10,
        chat_id: 20,
        sender: Sender {
            id: user,
            first_name: "Alex".to_string(),
            username: Some("alex".to_string()),
        },
        text: Some(text.to_string()),
        attachment: None,
    }
}

fn text(text: &str) -> InboundMessage {
    text_from(OWNER, text)
}

fn document(file_name: &str) -> InboundMessage {
    InboundMessage {
        text: None,
        attachment: Some(Attachment {
            file_id: "file-1".to_string(),
            file_name: Some(file_name.to_string()),
        }),
        ..text("")
    }
}

fn torrent(id: i64, name: &str) -> TorrentRecord {
    TorrentRecord {
        id,
        name: name.to_string(),
        status: Some(TorrentStatus::Downloading),
        percent_done: Some(0.5),
        total_size: Some(1 << 30),
    }
}

#[tokio::test]
async fn unauthorized_users_get_nothing() {
    let manager = Arc::new(FakeManager {
        torrents: vec![torrent(1, "a")],
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport {
        file: Some(vec![1, 2, 3]),
        ..Default::default()
    });
    let relay = relay(&manager, &transport);

    for msg in [
        text_from(999, "/start"),
        text_from(999, "/list"),
        text_from(999, "/remove 1 data"),
        text_from(999, "magnet:?xt=urn:btih:abc"),
        InboundMessage {
            sender: Sender {
                id: 999,
                first_name: "Eve".to_string(),
                username: None,
            },
            ..document("a.torrent")
        },
    ] {
        relay.handle(msg).await;
    }

    assert!(transport.replies().is_empty());
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn empty_list() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/list")).await;

    assert_eq!(transport.replies(), vec!["No torrents found".to_string()]);
}

#[tokio::test]
async fn long_list_is_chunked() {
    let torrents = (1..=300)
        .map(|i| torrent(i, &format!("some.rather.long.release.name.{i:03}.1080p.WEB-DL")))
        .collect::<Vec<_>>();
    let manager = Arc::new(FakeManager {
        torrents: torrents.clone(),
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/list")).await;

    let replies = transport.replies();
    assert!(replies.len() > 1);
    assert!(replies.iter().all(|r| text_len(r) <= MAX_MESSAGE_LEN));
    assert!(replies[0].starts_with("Torrents (300):"));

    let joined = replies.join("\n");
    let lines = joined.lines().skip(1).collect::<Vec<_>>();
    assert_eq!(lines.len(), torrents.len());
    for (line, t) in lines.iter().zip(&torrents) {
        assert!(
            line.starts_with(&format!("[{}] {} - 50.0%", t.id, t.name)),
            "{line}"
        );
    }
}

#[tokio::test]
async fn remove_invalid_id() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/remove abc")).await;

    assert_eq!(
        transport.replies(),
        vec!["Invalid torrent ID. Please provide a numeric ID.".to_string()]
    );
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn remove_without_args_shows_usage() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/remove")).await;

    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Usage: /remove <id> [data]"));
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn remove_not_found() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/remove 42")).await;

    assert_eq!(transport.replies(), vec!["Torrent 42 not found".to_string()]);
    assert_eq!(manager.calls(), vec!["get 42".to_string()]);
}

#[tokio::test]
async fn remove_with_data() {
    let manager = Arc::new(FakeManager {
        torrents: vec![torrent(42, "ubuntu.iso")],
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport)
        .handle(text("/remove 42 data"))
        .await;

    assert_eq!(
        transport.replies(),
        vec!["Torrent \"ubuntu.iso\" removed with data".to_string()]
    );
    assert_eq!(
        manager.calls(),
        vec!["get 42".to_string(), "remove 42 true".to_string()]
    );
}

#[tokio::test]
async fn remove_keeps_data_by_default() {
    let manager = Arc::new(FakeManager {
        torrents: vec![torrent(42, "ubuntu.iso")],
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/remove 42")).await;

    assert_eq!(
        transport.replies(),
        vec!["Torrent \"ubuntu.iso\" removed".to_string()]
    );
    assert_eq!(manager.calls()[1], "remove 42 false");
}

#[tokio::test]
async fn remove_failure_is_reported() {
    let manager = Arc::new(FakeManager {
        torrents: vec![torrent(42, "ubuntu.iso")],
        fail_remove: true,
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/remove 42")).await;

    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Failed to remove torrent:"));
    assert!(replies[0].contains("busy"));
}

#[tokio::test]
async fn magnets_report_each_result_in_order() {
    let bad = "magnet:?xt=urn:btih:bad";
    let manager = Arc::new(FakeManager {
        failing_magnets: HashSet::from([bad.to_string()]),
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport)
        .handle(text(&format!("magnet:?xt=urn:btih:good\n{bad}")))
        .await;

    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    let lines = replies[0].lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "Added 2 torrent(s):");
    assert_eq!(lines[1], "ID: 100 - from magnet");
    assert!(lines[2].starts_with("Failed: "), "{}", lines[2]);
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn non_torrent_document_is_rejected() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport {
        file: Some(vec![1]),
        ..Default::default()
    });
    relay(&manager, &transport).handle(document("movie.mkv")).await;

    assert_eq!(
        transport.replies(),
        vec!["Please send a .torrent file".to_string()]
    );
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn torrent_document_is_added_as_base64() {
    let data = b"d8:announce3:urle".to_vec();
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport {
        file: Some(data.clone()),
        ..Default::default()
    });
    relay(&manager, &transport).handle(document("Linux.Torrent")).await;

    assert_eq!(
        manager.calls(),
        vec![format!("add_file {}", STANDARD.encode(&data))]
    );
    assert_eq!(
        transport.replies(),
        vec!["Torrent added:\nID: 200\nName: from file".to_string()]
    );
}

#[tokio::test]
async fn failed_download_is_reported() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(document("a.torrent")).await;

    assert_eq!(
        transport.replies(),
        vec!["Failed to download file".to_string()]
    );
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn chatter_is_ignored() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("hi there")).await;

    assert!(transport.replies().is_empty());
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn static_commands() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    let relay = relay(&manager, &transport);
    relay.handle(text("/start")).await;
    relay.handle(text("/help")).await;
    relay.handle(text("/pause 3")).await;

    let replies = transport.replies();
    assert!(replies[0].starts_with("Welcome, Alex!"));
    assert!(replies[1].contains("/remove <id> data"));
    assert_eq!(
        replies[2],
        "Unknown command. Use /help to see available commands."
    );
    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn list_failure_is_reported() {
    let manager = Arc::new(FakeManager {
        fail_list: true,
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/list")).await;

    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Failed to list torrents: "), "{}", replies[0]);
    assert!(replies[0].contains("unauthorized"));
}

#[tokio::test]
async fn remove_stops_when_lookup_fails() {
    let manager = Arc::new(FakeManager {
        torrents: vec![torrent(42, "ubuntu.iso")],
        fail_get: true,
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport).handle(text("/remove 42 data")).await;

    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Failed to get torrent: "), "{}", replies[0]);
    assert!(replies[0].contains("timed out"));
    assert_eq!(manager.calls(), vec!["get 42".to_string()]);
}

#[tokio::test]
async fn torrent_add_failure_is_reported() {
    let manager = Arc::new(FakeManager {
        fail_add_file: true,
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport {
        file: Some(b"not bencode".to_vec()),
        ..Default::default()
    });
    relay(&manager, &transport).handle(document("a.torrent")).await;

    let replies = transport.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Failed to add torrent: "), "{}", replies[0]);
    assert!(replies[0].contains("invalid or corrupt torrent file"));
    assert_eq!(manager.calls().len(), 1);
}

#[tokio::test]
async fn slash_path_with_magnet_is_not_a_command() {
    let manager = Arc::new(FakeManager::default());
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport)
        .handle(text("/path/to/file magnet:?xt=urn:btih:abc"))
        .await;

    assert_eq!(
        manager.calls(),
        vec!["add_magnet magnet:?xt=urn:btih:abc".to_string()]
    );
    assert_eq!(
        transport.replies(),
        vec!["Added 1 torrent(s):\nID: 100 - from magnet".to_string()]
    );
}

#[tokio::test]
async fn large_magnet_batch_is_split() {
    let magnets = (0..400)
        .map(|i| format!("magnet:?xt=urn:btih:{i:040}"))
        .collect::<Vec<_>>();
    let manager = Arc::new(FakeManager {
        failing_magnets: magnets.iter().step_by(2).cloned().collect(),
        ..Default::default()
    });
    let transport = Arc::new(FakeTransport::default());
    relay(&manager, &transport)
        .handle(text(&magnets.join(" ")))
        .await;

    let replies = transport.replies();
    assert!(replies.len() > 1);
    assert!(replies.iter().all(|r| text_len(r) <= MAX_MESSAGE_LEN));
    assert!(replies[0].starts_with("Added 400 torrent(s):\n"));

    let joined = replies.join("\n");
    let lines = joined.lines().skip(1).collect::<Vec<_>>();
    assert_eq!(lines.len(), magnets.len());
    assert!(lines[0].starts_with("Failed: "));
    assert_eq!(lines[1], "ID: 100 - from magnet");
}
