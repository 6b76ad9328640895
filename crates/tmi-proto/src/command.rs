//! Commands understood by a TMI client.
//!
//! Only the handful of commands a chat bot sends or reacts to get their own
//! variant; everything else is kept verbatim in [`Command::Raw`].

use std::fmt::{self, Write};

use crate::error::MessageParseError;

/// A TMI command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// `PASS <password>`
    PASS(String),
    /// `NICK <nickname>`
    NICK(String),
    /// `JOIN <channels>` (comma-separated list)
    JOIN(String),
    /// `PART <channel>`
    PART(String),
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> :<text>`
    NOTICE(String, String),
    /// `PING <server> [<server2>]`
    PING(String, Option<String>),
    /// `PONG <server> [<server2>]`
    PONG(String, Option<String>),
    /// `CAP <subcommand> [args...]`
    CAP(Vec<String>),
    /// Twitch asks the client to reconnect (server maintenance).
    RECONNECT,
    /// Numeric reply such as `001`.
    Response(u16, Vec<String>),
    /// Any other command, kept as name plus parameters.
    Raw(String, Vec<String>),
}

fn require(
    command: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), MessageParseError> {
    if args.len() < expected {
        return Err(MessageParseError::NotEnoughArguments {
            command,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

impl Command {
    /// Build a command from its name and raw parameters.
    pub fn new(name: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        if name.is_empty() {
            return Err(MessageParseError::InvalidCommand);
        }

        let upper = name.to_ascii_uppercase();
        let cmd = match upper.as_str() {
            "PASS" => {
                require("PASS", &args, 1)?;
                Command::PASS(args[0].to_owned())
            }
            "NICK" => {
                require("NICK", &args, 1)?;
                Command::NICK(args[0].to_owned())
            }
            "JOIN" => {
                require("JOIN", &args, 1)?;
                Command::JOIN(args[0].to_owned())
            }
            "PART" => {
                require("PART", &args, 1)?;
                Command::PART(args[0].to_owned())
            }
            "PRIVMSG" => {
                require("PRIVMSG", &args, 2)?;
                Command::PRIVMSG(args[0].to_owned(), args[1].to_owned())
            }
            "NOTICE" => {
                require("NOTICE", &args, 2)?;
                Command::NOTICE(args[0].to_owned(), args[1].to_owned())
            }
            "PING" => {
                require("PING", &args, 1)?;
                Command::PING(args[0].to_owned(), args.get(1).map(|s| (*s).to_owned()))
            }
            "PONG" => {
                require("PONG", &args, 1)?;
                Command::PONG(args[0].to_owned(), args.get(1).map(|s| (*s).to_owned()))
            }
            "CAP" => Command::CAP(args.into_iter().map(str::to_owned).collect()),
            "RECONNECT" => Command::RECONNECT,
            _ if upper.len() == 3 && upper.bytes().all(|b| b.is_ascii_digit()) => {
                let code = upper
                    .parse()
                    .map_err(|_| MessageParseError::InvalidCommand)?;
                Command::Response(code, args.into_iter().map(str::to_owned).collect())
            }
            _ => Command::Raw(
                name.to_owned(),
                args.into_iter().map(str::to_owned).collect(),
            ),
        };
        Ok(cmd)
    }

    /// The command name as it appears on the wire.
    pub fn name(&self) -> String {
        match self {
            Command::PASS(_) => "PASS".to_string(),
            Command::NICK(_) => "NICK".to_string(),
            Command::JOIN(_) => "JOIN".to_string(),
            Command::PART(_) => "PART".to_string(),
            Command::PRIVMSG(_, _) => "PRIVMSG".to_string(),
            Command::NOTICE(_, _) => "NOTICE".to_string(),
            Command::PING(_, _) => "PING".to_string(),
            Command::PONG(_, _) => "PONG".to_string(),
            Command::CAP(_) => "CAP".to_string(),
            Command::RECONNECT => "RECONNECT".to_string(),
            Command::Response(code, _) => format!("{:03}", code),
            Command::Raw(name, _) => name.clone(),
        }
    }
}

/// Trailing parameters need a colon if empty, containing a space or starting with ':'.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Parameters must never smuggle a line break or NUL onto the wire.
fn validate_param(param: &str) -> fmt::Result {
    if param.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
        return Err(fmt::Error);
    }
    Ok(())
}

fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    let Some((trailing, middle)) = args.split_last() else {
        return Ok(());
    };
    for param in middle {
        validate_param(param)?;
        f.write_char(' ')?;
        f.write_str(param)?;
    }
    validate_param(trailing)?;
    f.write_char(' ')?;
    if needs_colon_prefix(trailing) {
        f.write_char(':')?;
    }
    f.write_str(trailing)
}

/// Like [`write_cmd`] but always emits the last argument in trailing form.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    let Some((trailing, middle)) = args.split_last() else {
        return Ok(());
    };
    for param in middle {
        validate_param(param)?;
        f.write_char(' ')?;
        f.write_str(param)?;
    }
    validate_param(trailing)?;
    f.write_str(" :")?;
    f.write_str(trailing)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(p) => write_cmd(f, "PASS", &[p]),
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::JOIN(c) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c) => write_cmd(f, "PART", &[c]),
            Command::PRIVMSG(t, m) => write_cmd_freeform(f, "PRIVMSG", &[t, m]),
            Command::NOTICE(t, m) => write_cmd_freeform(f, "NOTICE", &[t, m]),
            Command::PING(s, Some(s2)) => write_cmd_freeform(f, "PING", &[s, s2]),
            Command::PING(s, None) => write_cmd_freeform(f, "PING", &[s]),
            Command::PONG(s, Some(s2)) => write_cmd_freeform(f, "PONG", &[s, s2]),
            Command::PONG(s, None) => write_cmd_freeform(f, "PONG", &[s]),
            Command::CAP(args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, "CAP", &args)
            }
            Command::RECONNECT => f.write_str("RECONNECT"),
            Command::Response(code, args) => {
                let name = format!("{:03}", code);
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, &name, &args)
            }
            Command::Raw(name, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, name, &args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_known_commands() {
        assert_eq!(
            Command::new("privmsg", vec!["#chan", "hi there"]).unwrap(),
            Command::PRIVMSG("#chan".to_string(), "hi there".to_string())
        );
        assert_eq!(
            Command::new("PING", vec!["tmi.twitch.tv"]).unwrap(),
            Command::PING("tmi.twitch.tv".to_string(), None)
        );
        assert_eq!(Command::new("RECONNECT", vec![]).unwrap(), Command::RECONNECT);
    }

    #[test]
    fn numeric_becomes_response() {
        let cmd = Command::new("001", vec!["bot", "Welcome, GLHF!"]).unwrap();
        assert_eq!(
            cmd,
            Command::Response(1, vec!["bot".to_string(), "Welcome, GLHF!".to_string()])
        );
        assert_eq!(cmd.name(), "001");
    }

    #[test]
    fn unknown_is_raw() {
        let cmd = Command::new("USERSTATE", vec!["#chan"]).unwrap();
        assert_eq!(
            cmd,
            Command::Raw("USERSTATE".to_string(), vec!["#chan".to_string()])
        );
    }

    #[test]
    fn missing_params_is_an_error() {
        let err = Command::new("PRIVMSG", vec!["#chan"]).unwrap_err();
        assert_eq!(
            err,
            MessageParseError::NotEnoughArguments {
                command: "PRIVMSG",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn display_uses_trailing_where_needed() {
        assert_eq!(
            Command::PRIVMSG("#chan".to_string(), "x".to_string()).to_string(),
            "PRIVMSG #chan :x"
        );
        assert_eq!(
            Command::CAP(vec![
                "REQ".to_string(),
                "twitch.tv/tags twitch.tv/commands".to_string()
            ])
            .to_string(),
            "CAP REQ :twitch.tv/tags twitch.tv/commands"
        );
        assert_eq!(Command::NICK("bot".to_string()).to_string(), "NICK bot");
        assert_eq!(
            Command::PONG("tmi.twitch.tv".to_string(), None).to_string(),
            "PONG :tmi.twitch.tv"
        );
    }

    #[test]
    fn display_rejects_line_breaks() {
        let cmd = Command::PRIVMSG("#chan".to_string(), "a\r\nJOIN #evil".to_string());
        assert!(fmt::write(&mut String::new(), format_args!("{}", cmd)).is_err());
    }
}
