//! Shared bot state.
//!
//! Contains the channel registry and the per-channel countdown timers.

mod channels;
mod dashmap_ext;
mod timer;

pub use channels::{Channel, ChannelRegistry};
pub use timer::{format_duration, format_end_time};
