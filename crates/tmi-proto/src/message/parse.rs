//! `FromStr` for [`Message`] on top of the nom parser.

use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

use super::nom_parser::ParsedMessage;
use super::tags::unescape_tag_value;
use super::types::{Message, Tag};

/// Split a raw tags string (without the leading `@`) into tags.
fn parse_tags_string(tags_str: &str) -> Vec<Tag> {
    tags_str
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| {
            let mut iter = tag.splitn(2, '=');
            let key = iter.next().unwrap_or("");
            let value = iter.next().map(unescape_tag_value);
            Tag(key.to_owned(), value)
        })
        .collect()
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        if s.trim_end_matches(['\r', '\n']).is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        let parsed = ParsedMessage::parse(s).map_err(|parse_err| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause: MessageParseError::ParseContext {
                position: parse_err.position,
                context: format!("{:?}", parse_err.kind),
            },
        })?;

        let tags = parsed.tags.map(parse_tags_string);

        Message::with_tags(tags, parsed.prefix, parsed.command, parsed.params.to_vec()).map_err(
            |cause| ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::prefix::Prefix;

    #[test]
    fn test_parse_ping() {
        let msg: Message = "PING :tmi.twitch.tv\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("tmi.twitch.tv".to_string(), None));
    }

    #[test]
    fn test_parse_tagged_privmsg() {
        let raw = "@badge-info=;badges=broadcaster/1;display-name=Jon;mod=0;room-id=1234;tmi-sent-ts=1700000000123;user-id=1234;user-type= :jon!jon@jon.tmi.twitch.tv PRIVMSG #jon :@bot addtime 2\r\n";
        let msg: Message = raw.parse().unwrap();

        assert_eq!(msg.tag_value("display-name"), Some("Jon"));
        assert_eq!(msg.tag_value("tmi-sent-ts"), Some("1700000000123"));
        assert_eq!(msg.tag_value("user-type"), Some(""));
        assert_eq!(msg.tag_value("badge-info"), Some(""));
        assert_eq!(msg.source_nickname(), Some("jon"));
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#jon".to_string(), "@bot addtime 2".to_string())
        );
    }

    #[test]
    fn test_parse_valueless_tag() {
        let msg: Message = "@flag;k=v :tmi.twitch.tv RECONNECT".parse().unwrap();
        let tags = msg.tags.as_ref().unwrap();
        assert_eq!(tags[0], Tag("flag".to_string(), None));
        assert_eq!(msg.tag_value("flag"), None);
        assert_eq!(msg.tag_value("k"), Some("v"));
        assert_eq!(msg.command, Command::RECONNECT);
        assert_eq!(
            msg.prefix,
            Some(Prefix::ServerName("tmi.twitch.tv".to_string()))
        );
    }

    #[test]
    fn test_parse_escaped_tag() {
        let msg: Message = "@system-msg=a\\sraid\\shas\\sstarted :tmi.twitch.tv USERNOTICE #chan"
            .parse()
            .unwrap();
        assert_eq!(msg.tag_value("system-msg"), Some("a raid has started"));
    }

    #[test]
    fn test_parse_welcome_numeric() {
        let msg: Message = ":tmi.twitch.tv 001 bot :Welcome, GLHF!\r\n".parse().unwrap();
        assert!(matches!(msg.command, Command::Response(1, _)));
    }

    #[test]
    fn test_parse_empty_message() {
        let err = "\r\n".parse::<Message>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::EmptyMessage,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_short_privmsg_is_error() {
        assert!("PRIVMSG #chan".parse::<Message>().is_err());
    }
}
