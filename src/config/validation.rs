//! Configuration validation.
//!
//! Runs once at startup, before any connection is made. All problems are
//! collected so they can be reported together.

use thiserror::Error;

use super::Config;
use super::duration::DurationError;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("twitch.username is required (or set CHAT_COUNTDOWN_USERNAME)")]
    MissingUsername,
    #[error("twitch.token is required (or set CHAT_COUNTDOWN_TOKEN)")]
    MissingToken,
    #[error("timer.interval is invalid: {0}")]
    InvalidInterval(#[from] DurationError),
    #[error("timer.interval must be positive, got {0:?}")]
    NonPositiveInterval(String),
    #[error("twitch.host is required")]
    MissingHost,
    #[error("bot.aliases entry {0:?} must start with '@'")]
    InvalidAlias(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.twitch.username.trim().is_empty() {
        errors.push(ValidationError::MissingUsername);
    }
    if config.twitch.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    }
    if config.twitch.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }

    match config.timer.interval() {
        Ok(interval) if interval <= chrono::TimeDelta::zero() => {
            errors.push(ValidationError::NonPositiveInterval(
                config.timer.interval.clone(),
            ));
        }
        Ok(_) => {}
        Err(e) => errors.push(e.into()),
    }

    for alias in &config.bot.aliases {
        if !alias.starts_with('@') || alias.len() < 2 {
            errors.push(ValidationError::InvalidAlias(alias.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
