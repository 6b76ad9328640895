//! Core handler infrastructure.
//!
//! This module contains the handler trait, the per-command context with its
//! reply capability, and the handler registry.

pub mod context;
pub mod registry;

pub use context::{Context, Handler, HandlerError, HandlerResult, ReplySink, message_timestamp};
pub use registry::Registry;
