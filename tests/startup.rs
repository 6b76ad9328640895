//! Startup behaviour: configuration errors and environment overrides.

mod common;

use common::{FakeServer, TestBot};
use std::time::Duration;

#[tokio::test]
async fn test_missing_credentials_exit_before_connecting() -> anyhow::Result<()> {
    let server = FakeServer::bind().await?;
    let config = format!(
        "[twitch]\nchannels = \"streamer\"\nhost = \"127.0.0.1\"\nport = {}\ntls = false\n",
        server.port()
    );
    let mut bot = TestBot::spawn(&config, &[])?;

    let status = bot.wait_exit(Duration::from_secs(5)).await?;
    assert!(!status.success());
    Ok(())
}

#[tokio::test]
async fn test_non_positive_interval_is_fatal() -> anyhow::Result<()> {
    let server = FakeServer::bind().await?;
    let config = TestBot::config(server.port(), "streamer").replace("\"5m\"", "\"0s\"");
    let mut bot = TestBot::spawn(&config, &[])?;

    let status = bot.wait_exit(Duration::from_secs(5)).await?;
    assert!(!status.success());
    Ok(())
}

#[tokio::test]
async fn test_unparsable_config_file_is_fatal() -> anyhow::Result<()> {
    let mut bot = TestBot::spawn("[twitch\nusername = ", &[])?;
    let status = bot.wait_exit(Duration::from_secs(5)).await?;
    assert!(!status.success());
    Ok(())
}

#[tokio::test]
async fn test_environment_overrides_file() -> anyhow::Result<()> {
    let server = FakeServer::bind().await?;
    let config = format!(
        "[twitch]\nchannels = \"filechan\"\nhost = \"127.0.0.1\"\nport = {}\ntls = false\n",
        server.port()
    );
    let _bot = TestBot::spawn(
        &config,
        &[
            ("CHAT_COUNTDOWN_USERNAME", "EnvBot"),
            ("CHAT_COUNTDOWN_TOKEN", "envtoken"),
            ("CHAT_COUNTDOWN_CHANNELS", "#envchan,other"),
            ("CHAT_COUNTDOWN_TIMERINTERVAL", "90s"),
        ],
    )?;

    let mut conn = server.accept().await?;
    let (pass, nick) = conn.accept_login().await?;
    assert_eq!(pass, "oauth:envtoken");
    assert_eq!(nick, "envbot");
    assert_eq!(conn.recv_line().await?, "JOIN #envchan,#other");

    conn.chat(
        "envchan",
        "viewer",
        "Viewer",
        chrono::Utc::now().timestamp_millis(),
        "@EnvBot addtime",
    )
    .await?;
    let (target, text) = conn.expect_privmsg().await?;
    assert_eq!(target, "#envchan");
    assert!(
        text == "@Viewer: 1m30s" || text.starts_with("@Viewer: 1m2"),
        "unexpected reply {text:?}"
    );
    Ok(())
}
