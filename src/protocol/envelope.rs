//! Outbound message envelope and known task payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Action that asks the service to generate a new video
pub const NEW_CREATE_VIDEO: &str = "new-create-video";

// ─────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────

/// Wrapper sent for every outbound task
///
/// Serializes to `{"api_key": ..., "action": ..., "task": ...}`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Credential embedded in every message
    pub api_key: String,

    /// Action name understood by the service
    pub action: String,

    /// Free-form task payload
    pub task: Value,
}

impl Envelope {
    /// Build an envelope, encoding the task as JSON
    pub fn new<T>(api_key: impl Into<String>, action: impl Into<String>, task: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let task = serde_json::to_value(task).map_err(|source| Error::Serialization { source })?;
        Ok(Self {
            api_key: api_key.into(),
            action: action.into(),
            task,
        })
    }

    /// Serialize to the wire text
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|source| Error::Serialization { source })
    }

    /// Deserialize from wire text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::parse(json, source))
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("api_key", &"********")
            .field("action", &self.action)
            .field("task", &self.task)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────
// Video Task
// ─────────────────────────────────────────────────────────────────

/// Task payload for [`NEW_CREATE_VIDEO`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTask {
    /// Natural-language description of the video
    pub prompt: String,
}

impl VideoTask {
    /// Create a task, rejecting blank prompts
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(Error::InvalidTask("prompt must not be empty".to_string()));
        }
        Ok(Self { prompt })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
