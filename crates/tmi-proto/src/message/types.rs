use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;

/// An IRCv3 message tag: key plus optional value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tag(pub String, pub Option<String>);

/// An owned TMI message.
///
/// ```
/// use tmi_proto::Message;
///
/// let msg: Message = "@room-id=1337 :tmi.twitch.tv ROOMSTATE #chan".parse().unwrap();
/// assert_eq!(msg.tag_value("room-id"), Some("1337"));
///
/// let join = Message::join(["first", "#second"]);
/// assert_eq!(join.to_string(), "JOIN #first,#second\r\n");
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// IRCv3 message tags.
    pub tags: Option<Vec<Tag>>,
    /// Message prefix/source.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Create a message with tags from raw components.
    pub fn with_tags(
        tags: Option<Vec<Tag>>,
        prefix: Option<&str>,
        command: &str,
        args: Vec<&str>,
    ) -> Result<Message, MessageParseError> {
        Ok(Message {
            tags,
            prefix: prefix.map(Prefix::new_from_str),
            command: Command::new(command, args)?,
        })
    }

    /// Get the value of an IRCv3 tag by key.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .as_ref()?
            .iter()
            .find(|Tag(k, _)| k == key)
            .and_then(|Tag(_, v)| v.as_deref())
    }

    /// Get the nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nickname)
    }

    /// Attach a tag, replacing nothing (tags are appended in order).
    #[must_use]
    pub fn with_tag(mut self, key: &str, value: Option<&str>) -> Self {
        self.tags
            .get_or_insert_with(Vec::new)
            .push(Tag(key.to_string(), value.map(str::to_string)));
        self
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// `PRIVMSG <target> :<text>`
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// `PASS <password>`
    pub fn pass(password: impl Into<String>) -> Self {
        Command::PASS(password.into()).into()
    }

    /// `NICK <nickname>`
    pub fn nick(nickname: impl Into<String>) -> Self {
        Command::NICK(nickname.into()).into()
    }

    /// `JOIN #a,#b,...`; a missing `#` is added to each channel.
    pub fn join<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = channels
            .into_iter()
            .map(|c| {
                let c = c.as_ref();
                if c.starts_with('#') {
                    c.to_string()
                } else {
                    format!("#{}", c)
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        Command::JOIN(list).into()
    }

    /// `CAP REQ :<caps>`
    pub fn cap_req(caps: &[&str]) -> Self {
        Command::CAP(vec!["REQ".to_string(), caps.join(" ")]).into()
    }

    /// `PONG` answering a `PING` with the same payload.
    pub fn pong(server: impl Into<String>, server2: Option<String>) -> Self {
        Command::PONG(server.into(), server2).into()
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            tags: None,
            prefix: None,
            command,
        }
    }
}
