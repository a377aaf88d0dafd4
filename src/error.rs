//! Error types for the video generation client
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,
    MissingCredential = 103,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Connection errors (3xx)
    ConnectionFailed = 300,
    ConnectionTimeout = 301,
    TransportFailed = 302,
    ConnectionClosed = 303,

    // Protocol errors (4xx)
    SerializationFailed = 400,
    ParseFailed = 401,
    InvalidTask = 402,
    RemoteFailure = 403,

    // Client state errors (5xx)
    NotConnected = 500,
    AlreadyConnected = 501,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Connection errors
            400..=499 => 40, // Protocol errors
            500..=599 => 50, // Client state errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// No API key configured
    #[error("No API key configured for {url}")]
    MissingCredential { url: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Connection Errors
    // ─────────────────────────────────────────────────────────────

    /// The WebSocket could not be opened
    #[error("Failed to connect to {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    /// The WebSocket handshake did not finish in time
    #[error("Connection to {url} timed out after {timeout_ms}ms")]
    ConnectionTimeout { url: String, timeout_ms: u64 },

    /// Read or write failed on an established connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote side closed the connection
    #[error("Connection closed by remote: {reason}")]
    ConnectionClosed { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Protocol Errors
    // ─────────────────────────────────────────────────────────────

    /// Outbound task could not be encoded as JSON
    #[error("Failed to serialize task: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Inbound text was not valid JSON
    #[error("Received malformed reply ({source}): {preview}")]
    Parse {
        preview: String,
        #[source]
        source: serde_json::Error,
    },

    /// Task rejected before it was sent
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// The service replied with an error for the task
    #[error("Service reported an error: {0}")]
    Remote(String),

    // ─────────────────────────────────────────────────────────────
    // Client State Errors
    // ─────────────────────────────────────────────────────────────

    /// Operation attempted without an open connection
    #[error("Cannot {operation}: client is not connected")]
    NotConnected { operation: &'static str },

    /// connect() called while a connection is already open
    #[error("Client is already connected to {url}")]
    AlreadyConnected { url: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tungstenite::Error> for Error {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Error::ConnectionClosed {
                    reason: err.to_string(),
                }
            }
            other => Error::Transport(other.to_string()),
        }
    }
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::MissingCredential { .. } => ErrorCode::MissingCredential,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::ConnectionFailed { .. } => ErrorCode::ConnectionFailed,
            Error::ConnectionTimeout { .. } => ErrorCode::ConnectionTimeout,
            Error::Transport(_) => ErrorCode::TransportFailed,
            Error::ConnectionClosed { .. } => ErrorCode::ConnectionClosed,

            Error::Serialization { .. } => ErrorCode::SerializationFailed,
            Error::Parse { .. } => ErrorCode::ParseFailed,
            Error::InvalidTask(_) => ErrorCode::InvalidTask,
            Error::Remote(_) => ErrorCode::RemoteFailure,

            Error::NotConnected { .. } => ErrorCode::NotConnected,
            Error::AlreadyConnected { .. } => ErrorCode::AlreadyConnected,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a caller could reasonably reconnect and try again.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed { .. }
                | Error::ConnectionTimeout { .. }
                | Error::Transport(_)
                | Error::ConnectionClosed { .. }
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'vidgen-client config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'vidgen-client config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::MissingCredential { .. } => Some(
                "Set 'api_key' under [service] in the configuration file or export VIDGEN_API_KEY."
            ),

            Error::ConnectionFailed { .. } => Some(
                "Check your network connection and verify the service URL is correct."
            ),
            Error::ConnectionTimeout { .. } => Some(
                "The service may be down or unreachable. Check your firewall settings."
            ),
            Error::ConnectionClosed { .. } => Some(
                "The service closed the connection. Run the command again to open a new one."
            ),

            Error::Parse { .. } => Some(
                "The service sent a reply that is not JSON. Re-run with -v to log the raw frames."
            ),
            Error::InvalidTask(_) => Some(
                "Provide a non-empty prompt, or pass --task as a valid JSON document."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

/// Longest slice of a malformed reply kept in a parse error
const PREVIEW_CHARS: usize = 120;

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>, source: toml::de::Error) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConnectionFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a parse error, keeping a short preview of the offending text
    pub fn parse(text: &str, source: serde_json::Error) -> Self {
        let preview = if text.chars().count() > PREVIEW_CHARS {
            let head: String = text.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            text.to_string()
        };
        Error::Parse { preview, source }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
