//! Core configuration types and loading.

use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;

use super::duration::{DurationError, parse_duration_string};
use super::secret::AuthToken;

/// Path tried when no config file is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const ENV_USERNAME: &str = "CHAT_COUNTDOWN_USERNAME";
pub const ENV_TOKEN: &str = "CHAT_COUNTDOWN_TOKEN";
pub const ENV_TIMER_INTERVAL: &str = "CHAT_COUNTDOWN_TIMERINTERVAL";
pub const ENV_CHANNELS: &str = "CHAT_COUNTDOWN_CHANNELS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Chat account and server.
    #[serde(default)]
    pub twitch: TwitchConfig,
    /// Countdown settings.
    #[serde(default)]
    pub timer: TimerConfig,
    /// Command recognition and canned replies.
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` when given, else from [`DEFAULT_CONFIG_PATH`] if that
    /// file exists, else start from defaults. Environment overrides are
    /// applied on top.
    pub fn from_sources(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `CHAT_COUNTDOWN_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = lookup(ENV_USERNAME) {
            self.twitch.username = username;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.twitch.token = AuthToken::new(token);
        }
        if let Some(interval) = lookup(ENV_TIMER_INTERVAL) {
            self.timer.interval = interval;
        }
        if let Some(channels) = lookup(ENV_CHANNELS) {
            self.twitch.channels = ChannelList::from_csv(&channels);
        }
    }
}

/// Chat account, channels and server endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitchConfig {
    /// Bot login; also the `@mention` the bot answers to.
    #[serde(default)]
    pub username: String,
    /// OAuth token, with or without the `oauth:` prefix.
    #[serde(default)]
    pub token: AuthToken,
    /// Channels to join, as an array or a comma-separated string.
    #[serde(default)]
    pub channels: ChannelList,
    #[serde(default = "default_host")]
    pub host: String,
    /// Defaults to 6697 with TLS, 6667 without.
    pub port: Option<u16>,
    #[serde(default = "default_true")]
    pub tls: bool,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: AuthToken::default(),
            channels: ChannelList::default(),
            host: default_host(),
            port: None,
            tls: true,
        }
    }
}

impl TwitchConfig {
    pub fn port(&self) -> u16 {
        match (self.port, self.tls) {
            (Some(port), _) => port,
            (None, true) => 6697,
            (None, false) => 6667,
        }
    }
}

/// Countdown settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    /// Length of one interval added by `addtime` (duration string).
    #[serde(default = "default_interval")]
    pub interval: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

impl TimerConfig {
    pub fn interval(&self) -> Result<TimeDelta, DurationError> {
        parse_duration_string(&self.interval)
    }
}

/// Command recognition and canned replies.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Extra mentions the bot answers to besides `@<username>`.
    #[serde(default = "default_aliases")]
    pub aliases: Vec<String>,
    /// Emote used when the bot is mentioned without a command.
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            greeting: default_greeting(),
        }
    }
}

/// Normalized channel logins: no `#`, lowercase, no empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawChannels")]
pub struct ChannelList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChannels {
    List(Vec<String>),
    Csv(String),
}

impl From<RawChannels> for ChannelList {
    fn from(raw: RawChannels) -> Self {
        match raw {
            RawChannels::List(items) => Self::new(items),
            RawChannels::Csv(csv) => Self::from_csv(&csv),
        }
    }
}

impl ChannelList {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            items
                .into_iter()
                .map(|c| c.as_ref().trim().trim_start_matches('#').to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }

    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval() -> String {
    "5m".to_string()
}

fn default_aliases() -> Vec<String> {
    vec!["@idiot".to_string()]
}

fn default_greeting() -> String {
    "jonowGUN".to_string()
}
