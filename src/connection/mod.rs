//! Connection to the video generation service
//!
//! - `VideoClient`: connect, send, receive, close over one WebSocket
//! - `Connector` / `Transport`: the seam to the WebSocket library
//! - `ClientObserver`: hooks for logging and instrumentation
//! - `mock`: scripted transport for tests

mod client;
pub mod mock;
mod observer;
mod transport;

pub use client::*;
pub use mock::MockConnector;
pub use observer::*;
pub use transport::*;
