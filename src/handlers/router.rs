//! Chat message routing.
//!
//! Recognizes messages addressed to the bot, splits them into a command word
//! and arguments, and runs the matching handler from the [`Registry`].

use std::sync::Arc;

use chrono::TimeDelta;
use tmi_proto::ChatMessage;
use tracing::debug;

use super::core::{Context, Registry, ReplySink, message_timestamp};
use super::roles::{sent_by_admin, sent_by_broadcaster, sent_by_mod};
use crate::config::BotConfig;
use crate::state::ChannelRegistry;
use crate::telemetry::spans::{self, Roles};

/// What the router did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not addressed to the bot.
    Ignored,
    /// Bot mentioned with nothing after it.
    Greeted,
    /// Handler ran and replied.
    Handled(&'static str),
    /// Handler refused the input and a usage reply was sent.
    Rejected(&'static str),
    /// Unrecognized command word.
    Unknown,
}

/// Routes chat messages to command handlers.
pub struct Router {
    registry: Registry,
    channels: Arc<ChannelRegistry>,
    mentions: Vec<String>,
    greeting: String,
    interval: TimeDelta,
}

impl Router {
    /// Router answering to `@<username>` and the configured aliases.
    pub fn new(
        username: &str,
        bot: &BotConfig,
        interval: TimeDelta,
        channels: Arc<ChannelRegistry>,
    ) -> Self {
        let mut mentions = vec![format!("@{}", username)];
        mentions.extend(bot.aliases.iter().cloned());

        Self {
            registry: Registry::new(),
            channels,
            mentions,
            greeting: bot.greeting.clone(),
            interval,
        }
    }

    #[cfg(test)]
    pub fn channels(&self) -> &Arc<ChannelRegistry> {
        &self.channels
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn is_mention(&self, token: &str) -> bool {
        self.mentions.iter().any(|m| m == token)
    }

    /// Handle one chat message, sending any replies through `sink`.
    pub fn route(&self, msg: &ChatMessage, sink: &dyn ReplySink) -> Outcome {
        let mut tokens = msg.text.split_whitespace();

        match tokens.next() {
            Some(first) if self.is_mention(first) => {}
            _ => return Outcome::Ignored,
        }

        let Some(command) = tokens.next() else {
            sink.say(
                &msg.channel,
                &format!("{} @{}", self.greeting, msg.display_name),
            );
            return Outcome::Greeted;
        };
        let args: Vec<&str> = tokens.collect();

        let roles = Roles {
            broadcaster: sent_by_broadcaster(msg),
            moderator: sent_by_mod(msg),
            admin: sent_by_admin(msg),
        };
        let span = spans::command(command, &msg.channel, &msg.user, roles);
        let _enter = span.enter();

        let ctx = Context {
            msg,
            args: &args,
            channels: &self.channels,
            interval: self.interval,
            sent_at: message_timestamp(msg),
            sink,
        };

        match self.registry.dispatch(command, &ctx) {
            None => {
                debug!("Unrecognized command");
                sink.say(&msg.channel, &format!("bruh ? @{}", msg.display_name));
                Outcome::Unknown
            }
            Some((word, Ok(()))) => Outcome::Handled(word),
            Some((_, Err(e))) => {
                ctx.reply(e.reply_text());
                Outcome::Rejected(e.error_code())
            }
        }
    }
}
