//! Command handler registry and dispatch.
//!
//! The `Registry` maps command words to handlers and keeps usage statistics.

use super::context::{Context, Handler, HandlerResult};
use crate::handlers::timer::{AddTimeHandler, TimeLeftHandler, UptimeHandler};
use crate::telemetry::CommandTimer;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    /// Command usage counters, logged on shutdown.
    command_counts: HashMap<&'static str, Arc<AtomicU64>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Extend the countdown
        handlers.insert("addtime", Box::new(AddTimeHandler));
        handlers.insert("ugh", Box::new(AddTimeHandler));

        // Queries
        handlers.insert("howmuchlonger", Box::new(TimeLeftHandler));
        handlers.insert("timeleft", Box::new(TimeLeftHandler));
        handlers.insert("remaining?", Box::new(TimeLeftHandler));
        handlers.insert("uptime", Box::new(UptimeHandler));

        let command_counts = handlers
            .keys()
            .map(|&cmd| (cmd, Arc::new(AtomicU64::new(0))))
            .collect();

        Self {
            handlers,
            command_counts,
        }
    }

    /// Whether `name` is a registered command word.
    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Command usage statistics, most used first. Unused commands are omitted.
    pub fn get_command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (*cmd, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        stats
    }

    /// Run the handler for `name`, returning the matched command word and the
    /// handler's result; `None` when no handler is registered.
    ///
    /// Matching is case-sensitive.
    pub fn dispatch(
        &self,
        name: &str,
        ctx: &Context<'_>,
    ) -> Option<(&'static str, HandlerResult)> {
        let (&cmd, handler) = self.handlers.get_key_value(name)?;

        if let Some(counter) = self.command_counts.get(cmd) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let _timer = CommandTimer::new(cmd);
        let result = handler.handle(ctx);

        if let Err(ref e) = result {
            debug!(command = cmd, error = %e, kind = e.error_code(), "Command error");
        }

        Some((cmd, result))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
