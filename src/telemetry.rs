//! Telemetry utilities for command timing and standard spans.

use std::time::Instant;

/// Guard timing one command; logs the elapsed time when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_us = self.start.elapsed().as_micros() as u64;
        tracing::trace!(command = self.command, elapsed_us, "Command finished");
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one chat server session.
    pub fn session(host: &str, port: u16, tls: bool) -> Span {
        info_span!("session", host = %host, port, tls)
    }

    /// Span for a chat command, with the sender's roles.
    pub fn command(name: &str, channel: &str, user: &str, roles: Roles) -> Span {
        info_span!(
            "command",
            name = %name,
            channel = %channel,
            user = %user,
            broadcaster = roles.broadcaster,
            moderator = roles.moderator,
            admin = roles.admin,
        )
    }

    /// Role flags recorded on command spans.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Roles {
        pub broadcaster: bool,
        pub moderator: bool,
        pub admin: bool,
    }
}
