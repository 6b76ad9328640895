//! Message prefix (source) types.
//!
//! TMI sends either the bare server name (`tmi.twitch.tv`) or a user mask of
//! the form `login!login@login.tmi.twitch.tv`.

use std::fmt::{self, Display, Formatter};

/// Origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g., "tmi.twitch.tv")
    ServerName(String),
    /// User prefix: (nickname, username, hostname)
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string leniently; components are not validated.
    pub fn new_from_str(s: &str) -> Self {
        if let Some((name, rest)) = s.split_once('!') {
            let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
            return Prefix::Nickname(name.to_string(), user.to_string(), host.to_string());
        }
        if let Some((name, host)) = s.split_once('@') {
            return Prefix::Nickname(name.to_string(), String::new(), host.to_string());
        }
        if s.contains('.') {
            Prefix::ServerName(s.to_string())
        } else {
            Prefix::Nickname(s.to_string(), String::new(), String::new())
        }
    }

    /// Nickname of a user prefix, `None` for servers.
    pub fn nickname(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}
