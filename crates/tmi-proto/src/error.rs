//! Error types for the TMI protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },

    /// A line exceeded the configured maximum length.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Length of the offending line.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Outbound data contained a control character that would break framing.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// A line could not be parsed into a [`crate::Message`].
    #[error("invalid message {string:?}: {cause}")]
    InvalidMessage {
        /// The raw line.
        string: String,
        /// Why parsing failed.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors produced while turning a line into a [`crate::Message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// The command token was missing or malformed.
    #[error("invalid command")]
    InvalidCommand,

    /// A known command was missing required parameters.
    #[error("{command} needs at least {expected} parameter(s), got {got}")]
    NotEnoughArguments {
        /// Command name.
        command: &'static str,
        /// Minimum parameter count.
        expected: usize,
        /// Parameters present.
        got: usize,
    },

    /// Parser failure with position information.
    #[error("parse error at position {position}: {context}")]
    ParseContext {
        /// Byte position in the input where parsing stopped.
        position: usize,
        /// Description of the failure.
        context: String,
    },
}
