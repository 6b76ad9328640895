//! Error types for command handling, timers and the chat transport.

use thiserror::Error;
use tmi_proto::ProtocolError;

// ============================================================================
// Timer Errors
// ============================================================================

/// Errors from timer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer duration overflow")]
    Overflow,
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur while handling a chat command.
///
/// Every variant maps to the text sent back to the user; none of them stop
/// the bot.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("too many arguments")]
    TooManyArguments,

    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("timer not started")]
    NotInitialized,

    #[error(transparent)]
    Timer(#[from] TimerError),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TooManyArguments => "too_many_arguments",
            Self::NotANumber(_) => "not_a_number",
            Self::NotInitialized => "not_initialized",
            Self::Timer(TimerError::Overflow) => "timer_overflow",
        }
    }

    /// Reply text for the user, sent as `@<name>: <text>`.
    pub fn reply_text(&self) -> &'static str {
        match self {
            Self::TooManyArguments => "bruh it's 'addtime [# of intervals]'",
            Self::NotANumber(_) | Self::Timer(TimerError::Overflow) => {
                "yo [# of intervals] is a number cmonBruh"
            }
            Self::NotInitialized => "timer hasn't been initialized yet!",
        }
    }
}

pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Client Errors (chat transport)
// ============================================================================

/// Errors raised by the chat connection.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("connection closed by server")]
    Closed,

    #[error("server requested reconnect")]
    Reconnect,

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

impl ClientError {
    /// Whether the session should be retried after this error.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthFailed(_))
    }

    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Protocol(_) => "protocol",
            Self::Tls(_) => "tls",
            Self::AuthFailed(_) => "auth_failed",
            Self::Closed => "closed",
            Self::Reconnect => "reconnect",
            Self::Timeout(_) => "timeout",
        }
    }
}
