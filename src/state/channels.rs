//! Channel registry: one [`Timer`] per chat channel.

use std::sync::Arc;

use dashmap::DashMap;

use super::dashmap_ext::DashMapExt;
use super::timer::{Timer, TimerState};

/// A joined chat channel and the countdown it owns.
#[derive(Debug)]
pub struct Channel {
    name: String,
    timer: Timer,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timer: Timer::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}

/// Concurrent map from channel name to [`Channel`].
///
/// Channels are created lazily on first use and never removed. The map's
/// shard guards are dropped before a caller can reach a channel's timer, so
/// registry locks and timer locks are never held together.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, Arc<Channel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the channel, creating it with an unstarted timer if needed.
    ///
    /// Concurrent first calls for the same name all observe one instance.
    pub fn get_or_create(&self, name: &str) -> Arc<Channel> {
        self.channels
            .get_or_insert_cloned(name, || Arc::new(Channel::new(name)))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get_cloned(name)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Timer state of every known channel, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, TimerState)> {
        let mut states: Vec<_> = self
            .channels
            .iter_cloned()
            .into_iter()
            .map(|(name, channel)| (name, channel.timer().snapshot()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }
}
