//! chat-countdown - per-channel countdown timer bot for Twitch chat.
//!
//! Viewers extend a channel's countdown with `@bot addtime [n]` and ask how
//! long is left with `@bot timeleft`.

mod config;
mod error;
mod handlers;
mod network;
mod state;
mod telemetry;

use crate::config::{Config, validation};
use crate::handlers::Router;
use crate::network::TmiClient;
use crate::state::{ChannelRegistry, format_duration, format_end_time};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration: file (argv[1] or ./config.toml), then environment
    let config_path = std::env::args().nth(1);
    let config = Config::from_sources(config_path.as_deref()).map_err(|e| {
        error!(path = ?config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }
    let interval = config.timer.interval()?;

    if config.twitch.channels.is_empty() {
        warn!("No channels configured; the bot will connect but join nothing");
    }

    info!(
        username = %config.twitch.username,
        channels = ?config.twitch.channels.as_slice(),
        interval = %format_duration(interval),
        host = %config.twitch.host,
        port = config.twitch.port(),
        tls = config.twitch.tls,
        "Starting chat-countdown"
    );

    let channels = Arc::new(ChannelRegistry::new());
    let router = Arc::new(Router::new(
        &config.twitch.username,
        &config.bot,
        interval,
        Arc::clone(&channels),
    ));

    let mut client = TmiClient::new(config.twitch.clone(), Arc::clone(&router));

    let result = tokio::select! {
        result = client.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            Ok(())
        }
    };

    for (command, count) in router.registry().get_command_stats() {
        info!(command, count, "Command usage");
    }
    if channels.is_empty() {
        info!("No channel timers were used");
    } else {
        info!(channels = channels.len(), "Final timer states");
        for (channel, state) in channels.snapshot() {
            if let Some(end) = state.end_time() {
                info!(
                    channel = %channel,
                    duration = %format_duration(state.duration),
                    end_time = %format_end_time(end),
                    "Final timer state"
                );
            }
        }
    }

    result?;
    Ok(())
}
