//! Integration test common infrastructure.
//!
//! Provides a fake chat server, the server side of a bot connection, and a
//! handle for the spawned bot process.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::BotConnection;
#[allow(unused_imports)]
pub use server::{FakeServer, TestBot};
