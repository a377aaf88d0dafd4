//! Client for a WebSocket video generation service
//!
//! Opens one WebSocket connection, sends JSON task envelopes
//! (`{"api_key", "action", "task"}`) and reads JSON replies.
//!
//! ```no_run
//! use vidgen_client::config::ClientSettings;
//! use vidgen_client::connection::VideoClient;
//! use vidgen_client::protocol::VideoTask;
//!
//! # async fn run() -> vidgen_client::error::Result<()> {
//! let settings = ClientSettings::new("wss://video.example.com/production", "my-key")?;
//! let mut client = VideoClient::new(settings);
//!
//! client.connect().await?;
//! let outcome = async {
//!     client.create_video(&VideoTask::new("Create a video about cats")?).await?;
//!     client.receive().await
//! }
//! .await;
//! client.close().await;
//!
//! println!("{}", outcome?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod protocol;

pub use config::{ClientConfig, ClientSettings};
pub use connection::{ConnectionState, VideoClient};
pub use error::{Error, Result};
