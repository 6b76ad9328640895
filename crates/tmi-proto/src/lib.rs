//! # tmi-proto
//!
//! Parsing and serialization of the IRC lines spoken by the Twitch Messaging
//! Interface (TMI), with IRCv3 message tag support.
//!
//! ## Parsing
//!
//! ```rust
//! use tmi_proto::{ChatMessage, Message};
//!
//! let raw = "@display-name=Viewer;tmi-sent-ts=1700000000000 :viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #somechannel :@bot uptime";
//! let message: Message = raw.parse().expect("valid TMI line");
//! let chat = ChatMessage::from_message(&message).expect("a channel PRIVMSG");
//!
//! assert_eq!(chat.channel, "somechannel");
//! assert_eq!(chat.display_name, "Viewer");
//! assert_eq!(chat.tag("tmi-sent-ts"), Some("1700000000000"));
//! ```
//!
//! ## Building outbound lines
//!
//! ```rust
//! use tmi_proto::Message;
//!
//! let reply = Message::privmsg("#somechannel", "@Viewer: 4m59s");
//! assert_eq!(reply.to_string(), "PRIVMSG #somechannel :@Viewer: 4m59s\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod chat;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod command;
pub mod error;
pub mod message;
pub mod prefix;

pub use self::chat::ChatMessage;
#[cfg(feature = "tokio")]
pub use self::codec::{LineCodec, TmiCodec};
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
pub use self::message::{Message, Tag};
pub use self::prefix::Prefix;

/// Maximum accepted line length: 8191 bytes of tags plus a 512 byte IRC body.
pub const MAX_TMI_LINE_LEN: usize = 8191 + 512;
