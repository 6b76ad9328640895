//! Chat command handlers.
//!
//! The [`Router`] decides whether a message is addressed to the bot and looks
//! the command word up in a handler registry. Each handler gets a context with
//! the message, its arguments and the channel registry, and replies through a
//! [`ReplySink`].

mod core;
mod roles;
mod router;
mod timer;

pub use self::core::ReplySink;
pub use router::{Outcome, Router};
