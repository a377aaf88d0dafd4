//! Transport seam between the client and the WebSocket library
//!
//! `Connector` opens connections and `Transport` carries text frames over
//! one of them. The production pair runs on tokio-tungstenite; tests swap in
//! [`super::mock`].

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientSettings;
use crate::error::{Error, Result};

/// One open, bidirectional text message stream
#[async_trait]
pub trait Transport: Send {
    /// Write one text message
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Wait for the next complete text message
    async fn recv_text(&mut self) -> Result<String>;

    /// Start the closing handshake
    async fn close(&mut self) -> Result<()>;
}

/// Opens transports to an endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &ClientSettings) -> Result<Box<dyn Transport>>;
}

// ─────────────────────────────────────────────────────────────────
// WebSocket implementation
// ─────────────────────────────────────────────────────────────────

/// Connector backed by tokio-tungstenite (native TLS for wss://)
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, settings: &ClientSettings) -> Result<Box<dyn Transport>> {
        let url = Url::parse(settings.url())
            .map_err(|e| Error::connection_failed(settings.url(), e.to_string()))?;

        let handshake = connect_async(url);
        let outcome = match settings.connect_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, handshake)
                .await
                .map_err(|_| Error::ConnectionTimeout {
                    url: settings.url().to_string(),
                    timeout_ms: millis(timeout),
                })?,
            None => handshake.await,
        };

        let (stream, response) =
            outcome.map_err(|e| Error::connection_failed(settings.url(), e.to_string()))?;
        debug!(status = %response.status(), "WebSocket handshake complete");

        Ok(Box::new(WsTransport { stream }))
    }
}

/// Whole milliseconds, saturating
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Transport over an established WebSocket stream
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(text),
                Some(Ok(WsMessage::Binary(data))) => {
                    // Invalid UTF-8 surfaces later as a JSON parse error
                    return Ok(String::from_utf8_lossy(&data).into_owned());
                }
                Some(Ok(WsMessage::Ping(_))) => {
                    // tungstenite queues the pong and flushes it on the next read
                    trace!("Received ping");
                }
                Some(Ok(WsMessage::Pong(_))) | Some(Ok(WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("{} {}", f.code, f.reason))
                        .unwrap_or_else(|| "close frame without reason".to_string());
                    return Err(Error::ConnectionClosed { reason });
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(Error::ConnectionClosed {
                        reason: "stream ended".to_string(),
                    })
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(200)), 200);
        assert_eq!(millis(Duration::from_micros(1500)), 1);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
