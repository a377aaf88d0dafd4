//! Wire protocol for the video generation service
//!
//! Outbound messages are JSON envelopes carrying the API key, an action name
//! and a free-form task. Inbound replies are arbitrary JSON; helpers here
//! interpret the fields the service is known to send.

mod envelope;
mod reply;

pub use envelope::*;
pub use reply::*;
