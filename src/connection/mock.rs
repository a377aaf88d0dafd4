//! Scripted in-memory transport for testing
//!
//! A [`MockConnector`] hands out transports that share one script: replies
//! queued with [`MockConnector::push_reply`] are returned by `recv_text` in
//! order and every sent frame is recorded for inspection.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::ClientSettings;
use crate::error::{Error, Result};

use super::{Connector, Transport};

/// Something the mock peer does when the client reads
#[derive(Debug, Clone)]
enum Inbound {
    Text(String),
    Close,
}

/// Shared script and recordings
#[derive(Debug, Default)]
struct MockState {
    inbound: VecDeque<Inbound>,
    sent: Vec<String>,
    refuse_with: Option<String>,
    fail_sends: bool,
    peer_closed: bool,
    connects: u32,
    closes: u32,
}

/// Connector whose transports follow a shared script
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<RwLock<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text frame for the client to read
    pub fn push_reply(&self, text: impl Into<String>) {
        self.state.write().inbound.push_back(Inbound::Text(text.into()));
    }

    /// Queue a close frame from the peer
    pub fn push_close(&self) {
        self.state.write().inbound.push_back(Inbound::Close);
    }

    /// Make every connection attempt fail
    pub fn refuse_connections(&self, message: impl Into<String>) {
        self.state.write().refuse_with = Some(message.into());
    }

    /// Make every write fail with a transport error
    pub fn fail_sends(&self) {
        self.state.write().fail_sends = true;
    }

    /// Frames written by the client, oldest first
    pub fn sent(&self) -> Vec<String> {
        self.state.read().sent.clone()
    }

    /// Number of successful connections
    pub fn connect_count(&self) -> u32 {
        self.state.read().connects
    }

    /// Number of closing handshakes started by the client
    pub fn close_count(&self) -> u32 {
        self.state.read().closes
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, settings: &ClientSettings) -> Result<Box<dyn Transport>> {
        let mut state = self.state.write();
        if let Some(ref message) = state.refuse_with {
            return Err(Error::connection_failed(settings.url(), message.clone()));
        }
        state.connects += 1;
        state.peer_closed = false;

        Ok(Box::new(MockTransport {
            state: self.state.clone(),
        }))
    }
}

/// Transport handed out by [`MockConnector`]
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<RwLock<MockState>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        let mut state = self.state.write();
        if state.peer_closed {
            return Err(Error::ConnectionClosed {
                reason: "peer closed".to_string(),
            });
        }
        if state.fail_sends {
            return Err(Error::Transport("broken pipe".to_string()));
        }
        state.sent.push(text);
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<String> {
        let mut state = self.state.write();
        match state.inbound.pop_front() {
            Some(Inbound::Text(text)) => Ok(text),
            Some(Inbound::Close) => {
                state.peer_closed = true;
                Err(Error::ConnectionClosed {
                    reason: "1000 normal closure".to_string(),
                })
            }
            None => Err(Error::Transport("no scripted reply".to_string())),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.state.write().closes += 1;
        Ok(())
    }
}
