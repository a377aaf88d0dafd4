//! Hooks for observing client activity

use serde_json::Value;
use tracing::{debug, info};

use crate::protocol::Envelope;

/// Receives notifications as the client connects, sends, receives and closes.
///
/// Every method has an empty default so implementors only override what they
/// care about.
pub trait ClientObserver: Send + Sync {
    fn on_connected(&self, _url: &str) {}

    fn on_sent(&self, _envelope: &Envelope) {}

    fn on_received(&self, _reply: &Value) {}

    fn on_closed(&self, _url: &str) {}
}

/// Emits `tracing` events. The API key is never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ClientObserver for TracingObserver {
    fn on_connected(&self, url: &str) {
        info!(url = %url, "Connected to video service");
    }

    fn on_sent(&self, envelope: &Envelope) {
        info!(action = %envelope.action, task = %envelope.task, "Sent task");
    }

    fn on_received(&self, reply: &Value) {
        debug!(reply = %reply, "Received reply");
    }

    fn on_closed(&self, url: &str) {
        info!(url = %url, "Connection closed");
    }
}

/// Silent observer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ClientObserver for NoopObserver {}
