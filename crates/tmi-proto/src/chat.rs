//! Channel chat messages.
//!
//! [`ChatMessage`] is the flattened view of a channel `PRIVMSG` that bots work
//! with: channel name without the `#`, sender login and display name, text and
//! a plain tag map.

use std::collections::HashMap;

use crate::command::Command;
use crate::message::{Message, Tag};

const ACTION_PREFIX: &str = "\u{1}ACTION ";

/// A chat line sent to a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel login, without the leading `#`.
    pub channel: String,
    /// Sender login (prefix nickname).
    pub user: String,
    /// Sender display name; the login when the tag is missing or empty.
    pub display_name: String,
    /// Message body. `/me` actions are unwrapped.
    pub text: String,
    /// Whether the message was a `/me` action.
    pub action: bool,
    /// Message tags.
    pub tags: HashMap<String, String>,
}

impl ChatMessage {
    /// Build a chat message by hand (tags can be added with [`ChatMessage::with_tag`]).
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let user = user.into();
        Self {
            channel: channel.into().trim_start_matches('#').to_string(),
            display_name: user.clone(),
            user,
            text: text.into(),
            action: false,
            tags: HashMap::new(),
        }
    }

    /// Add or replace a tag; `display-name` also updates [`ChatMessage::display_name`].
    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        if key == "display-name" && !value.is_empty() {
            self.display_name = value.to_string();
        }
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Convert a channel `PRIVMSG`; anything else yields `None`.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let Command::PRIVMSG(target, body) = &msg.command else {
            return None;
        };
        let channel = target.strip_prefix('#')?;
        let user = msg.source_nickname().unwrap_or_default().to_string();

        let tags: HashMap<String, String> = msg
            .tags
            .iter()
            .flatten()
            .map(|Tag(k, v)| (k.clone(), v.clone().unwrap_or_default()))
            .collect();

        let display_name = tags
            .get("display-name")
            .filter(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| user.clone());

        let (text, action) = match body.strip_prefix(ACTION_PREFIX) {
            Some(rest) => (rest.trim_end_matches('\u{1}').to_string(), true),
            None => (body.clone(), false),
        };

        Some(Self {
            channel: channel.to_string(),
            user,
            display_name,
            text,
            action,
            tags,
        })
    }

    /// Look up a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}
