//! Interpretation of inbound replies
//!
//! The service sends progress updates while a video renders and a final
//! message carrying either a video link or an error.

use serde_json::Value;
use url::Url;

/// What a reply means to a caller waiting on a video
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    /// Rendering finished; `link` points at the video
    VideoReady { link: String },

    /// Progress update
    Status { message: String },

    /// The service gave up on the task
    Failed { message: String },

    /// Anything the client does not recognise
    Other(Value),
}

impl ReplyEvent {
    /// Classify a reply. `link` wins over `status`, which wins over `error`.
    /// Empty strings count as absent.
    pub fn classify(reply: &Value) -> Self {
        let field = |name: &str| {
            reply
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(link) = field("link") {
            return ReplyEvent::VideoReady { link };
        }
        if let Some(message) = field("status") {
            return ReplyEvent::Status { message };
        }
        if let Some(message) = field("error") {
            return ReplyEvent::Failed { message };
        }
        ReplyEvent::Other(reply.clone())
    }

    /// No further replies are expected for the task
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReplyEvent::VideoReady { .. } | ReplyEvent::Failed { .. })
    }
}

/// Resolve a video link to a playable HLS playlist URL
///
/// Links already naming a `.m3u8` file are normalised, links into an `/hls/`
/// directory get `playlist.m3u8` appended (query string kept), anything else
/// is returned unchanged. Blank links yield `None`.
pub fn playlist_url(link: &str) -> Option<String> {
    if link.trim().is_empty() {
        return None;
    }

    if link.contains(".m3u8") {
        return Some(
            Url::parse(link)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| link.to_string()),
        );
    }

    if link.contains("/hls/") {
        let (base, query) = match link.split_once('?') {
            Some((base, query)) => (base, format!("?{}", query)),
            None => (link, String::new()),
        };
        let sep = if base.ends_with('/') { "" } else { "/" };
        return Some(format!("{}{}playlist.m3u8{}", base, sep, query));
    }

    Some(link.to_string())
}
