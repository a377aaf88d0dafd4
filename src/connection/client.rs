//! WebSocket client for the video generation service
//!
//! One client owns at most one connection. Every method takes `&mut self`,
//! so calls are strictly ordered; sharing a client between tasks needs an
//! external lock. Replies are not correlated with requests: callers alternate
//! send and receive.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientSettings;
use crate::error::{Error, Result};
use crate::protocol::{Envelope, NEW_CREATE_VIDEO};

use super::{ClientObserver, Connector, TracingObserver, Transport, WsConnector};

/// Lifecycle of the client's connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// connect() has not succeeded yet
    #[default]
    Uninitialized,
    /// A connection is open
    Connected,
    /// The connection was closed locally or by the peer
    Closed,
}

/// Client for submitting tasks over a single WebSocket connection
pub struct VideoClient {
    settings: ClientSettings,
    connector: Arc<dyn Connector>,
    observer: Arc<dyn ClientObserver>,
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
}

impl VideoClient {
    /// Create a client that connects over tokio-tungstenite
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_connector(settings, Arc::new(WsConnector))
    }

    /// Create a client with a custom connector
    pub fn with_connector(settings: ClientSettings, connector: Arc<dyn Connector>) -> Self {
        Self {
            settings,
            connector,
            observer: Arc::new(TracingObserver),
            transport: None,
            state: ConnectionState::Uninitialized,
        }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn ClientObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Open the connection.
    ///
    /// Fails with [`Error::AlreadyConnected`] while a connection is open. On
    /// failure the state is left as it was.
    pub async fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(Error::AlreadyConnected {
                url: self.settings.url().to_string(),
            });
        }

        debug!(url = %self.settings.url(), "Connecting");
        let transport = self.connector.connect(&self.settings).await?;

        self.transport = Some(transport);
        self.state = ConnectionState::Connected;
        self.observer.on_connected(self.settings.url());
        Ok(())
    }

    /// Send `task` under `action`. Does not wait for a reply.
    pub async fn send<T>(&mut self, action: &str, task: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.transport.is_none() {
            return Err(Error::NotConnected { operation: "send" });
        }

        let envelope = Envelope::new(self.settings.api_key(), action, task)?;
        let text = envelope.to_json()?;

        let transport = self
            .transport
            .as_mut()
            .ok_or(Error::NotConnected { operation: "send" })?;
        let sent = transport.send_text(text).await;
        sent.map_err(|e| self.release_if_closed(e))?;

        self.observer.on_sent(&envelope);
        Ok(())
    }

    /// Shorthand for `send("new-create-video", task)`
    pub async fn create_video<T>(&mut self, task: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.send(NEW_CREATE_VIDEO, task).await
    }

    /// Wait for the next message and parse it as JSON.
    ///
    /// Waits without a deadline. A malformed reply returns [`Error::Parse`]
    /// and leaves the connection open; a peer close returns
    /// [`Error::ConnectionClosed`] and moves the client to `Closed`.
    pub async fn receive(&mut self) -> Result<Value> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(Error::NotConnected { operation: "receive" })?;
        let received = transport.recv_text().await;
        let text = received.map_err(|e| self.release_if_closed(e))?;

        let reply: Value = serde_json::from_str(&text).map_err(|e| Error::parse(&text, e))?;
        self.observer.on_received(&reply);
        Ok(reply)
    }

    /// Send one task and wait for the next reply
    pub async fn request<T>(&mut self, action: &str, task: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        self.send(action, task).await?;
        self.receive().await
    }

    /// Close the connection if one is open. Calling it again is a no-op.
    ///
    /// The transport is released even when the closing handshake fails.
    pub async fn close(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };

        if let Err(e) = transport.close().await {
            warn!(error = %e, "Closing handshake failed, dropping connection");
        }
        drop(transport);

        self.state = ConnectionState::Closed;
        self.observer.on_closed(self.settings.url());
    }

    /// Drop the transport when the peer has gone away
    fn release_if_closed(&mut self, err: Error) -> Error {
        if let Error::ConnectionClosed { ref reason } = err {
            warn!(reason = %reason, "Connection closed by remote");
            self.transport = None;
            self.state = ConnectionState::Closed;
            self.observer.on_closed(self.settings.url());
        }
        err
    }
}

impl Drop for VideoClient {
    fn drop(&mut self) {
        if self.transport.is_some() {
            debug!(url = %self.settings.url(), "Client dropped while connected, releasing socket");
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
