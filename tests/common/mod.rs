#![allow(dead_code)]

//! Common test utilities and fixtures
//!
//! Provides fixture paths and an in-process mock of the video service.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

// ─────────────────────────────────────────────────────────────────
// Mock Video Service
// ─────────────────────────────────────────────────────────────────

/// WebSocket server that answers by action name
///
/// - `status`: `{"status":"ok","id":"42"}`
/// - `echo`: the task payload
/// - `new-create-video`: a status update, then a link (an error for the
///   prompt `doomed`)
/// - `garbage`: text that is not JSON
/// - `binary`: the task payload in a binary frame
/// - `ping`: a ping frame, then `{"after":"ping"}`
/// - `hangup`: a close frame
/// - `fail`: `{"error":"render failed"}`
pub struct MockService {
    addr: SocketAddr,
    shutdown_tx: Option<mpsc::Sender<()>>,
    messages_received: Arc<RwLock<Vec<String>>>,
}

impl MockService {
    /// Start the mock service on an ephemeral port
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let messages_received = Arc::new(RwLock::new(Vec::new()));
        let messages_clone = messages_received.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        if let Ok((stream, _)) = accept_result {
                            let messages = messages_clone.clone();
                            tokio::spawn(handle_connection(stream, messages));
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            messages_received,
        }
    }

    /// WebSocket URL for this mock service
    pub fn ws_url(&self) -> String {
        format!("ws://{}/production", self.addr)
    }

    /// Raw text frames received, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.messages_received.read().clone()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
    }
}

async fn handle_connection(stream: TcpStream, messages: Arc<RwLock<Vec<String>>>) {
    let Ok(ws_stream) = accept_async(stream).await else {
        return;
    };
    let (mut write, mut read) = ws_stream.split();

    while let Some(Ok(msg)) = read.next().await {
        let WsMessage::Text(text) = msg else {
            continue;
        };
        messages.write().push(text.clone());

        let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&text) else {
            continue;
        };
        let task = parsed["task"].clone();

        let replies: Vec<WsMessage> = match parsed["action"].as_str().unwrap_or_default() {
            "status" => vec![WsMessage::Text(r#"{"status":"ok","id":"42"}"#.to_string())],
            "echo" => vec![WsMessage::Text(task.to_string())],
            "new-create-video" if task["prompt"] == "doomed" => vec![
                WsMessage::Text(r#"{"status":"rendering"}"#.to_string()),
                WsMessage::Text(r#"{"error":"render failed"}"#.to_string()),
            ],
            "new-create-video" => vec![
                WsMessage::Text(r#"{"status":"rendering"}"#.to_string()),
                WsMessage::Text(r#"{"link":"https://cdn.example.com/hls/abc"}"#.to_string()),
            ],
            "garbage" => vec![WsMessage::Text("this is not json".to_string())],
            "binary" => vec![WsMessage::Binary(task.to_string().into_bytes())],
            "ping" => vec![
                WsMessage::Ping(b"are you there".to_vec()),
                WsMessage::Text(r#"{"after":"ping"}"#.to_string()),
            ],
            "fail" => vec![WsMessage::Text(r#"{"error":"render failed"}"#.to_string())],
            "hangup" => {
                let _ = write.send(WsMessage::Close(None)).await;
                break;
            }
            _ => vec![],
        };

        for reply in replies {
            if write.send(reply).await.is_err() {
                return;
            }
        }
    }
}
