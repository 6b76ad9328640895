//! Handler context and the reply capability.

use chrono::{DateTime, TimeDelta, Utc};
use tmi_proto::ChatMessage;

use crate::state::ChannelRegistry;

pub use crate::error::{HandlerError, HandlerResult};

/// Something that can post a line of text to a channel.
///
/// Implementations must not block: handlers call this from runtime worker
/// threads while holding no locks, and expect it to return immediately.
pub trait ReplySink: Send + Sync {
    fn say(&self, channel: &str, text: &str);
}

/// A chat command handler.
///
/// Handlers are synchronous; timer work never waits on I/O.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &Context<'_>) -> HandlerResult;
}

/// Everything a handler needs for one command.
pub struct Context<'a> {
    /// The triggering chat message.
    pub msg: &'a ChatMessage,
    /// Tokens after the command word.
    pub args: &'a [&'a str],
    /// Per-channel state.
    pub channels: &'a ChannelRegistry,
    /// Configured length of one `addtime` interval.
    pub interval: TimeDelta,
    /// When the message was sent (`tmi-sent-ts`, or receive time).
    pub sent_at: DateTime<Utc>,
    /// Where replies go.
    pub sink: &'a dyn ReplySink,
}

impl Context<'_> {
    /// Send `@<display name>: <text>` to the originating channel.
    pub fn reply(&self, text: &str) {
        self.sink.say(
            &self.msg.channel,
            &format!("@{}: {}", self.msg.display_name, text),
        );
    }

    /// Send `text` to the originating channel as-is.
    #[cfg(test)]
    pub fn say(&self, text: &str) {
        self.sink.say(&self.msg.channel, text);
    }
}

/// Milliseconds-since-epoch `tmi-sent-ts`, truncated to whole seconds.
///
/// Falls back to the current time when the tag is missing or malformed.
pub fn message_timestamp(msg: &ChatMessage) -> DateTime<Utc> {
    msg.tag("tmi-sent-ts")
        .and_then(|ts| ts.parse::<i64>().ok())
        .and_then(|ms| DateTime::from_timestamp(ms.div_euclid(1000), 0))
        .unwrap_or_else(Utc::now)
}

/// Sink that records every reply, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    lines: parking_lot::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(channel, text)` pairs sent so far.
    pub fn lines(&self) -> Vec<(String, String)> {
        self.lines.lock().clone()
    }

    /// Texts only.
    pub fn texts(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[cfg(test)]
impl ReplySink for RecordingSink {
    fn say(&self, channel: &str, text: &str) {
        self.lines.lock().push((channel.to_string(), text.to_string()));
    }
}
