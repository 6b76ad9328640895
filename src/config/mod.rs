//! Configuration loading and management.
//!
//! - [`types`]: config structs, file loading and environment overrides
//! - [`duration`]: duration strings (`5m`, `1h30m`)
//! - [`secret`]: the redacted auth token wrapper
//! - [`validation`]: startup checks

mod duration;
mod secret;
mod types;
pub mod validation;

pub use types::{BotConfig, Config, TwitchConfig};

#[cfg(test)]
pub use secret::AuthToken;
#[cfg(test)]
pub use types::ChannelList;
