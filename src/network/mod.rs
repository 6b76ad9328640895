//! Network module.
//!
//! Contains the chat session driver, the transport stream, TLS setup and the
//! outbound reply queue.

mod client;
mod outbound;
mod stream;
mod tls;

pub use client::TmiClient;
