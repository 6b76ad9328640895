//! Fake chat server and bot process management.
//!
//! The fake server listens on an ephemeral port; the bot binary is started
//! with a generated config pointing at it.

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

use super::client::BotConnection;

/// A listening fake chat server.
pub struct FakeServer {
    listener: TcpListener,
    port: u16,
}

impl FakeServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<BotConnection> {
        let (stream, _) = timeout(Duration::from_secs(10), self.listener.accept()).await??;
        Ok(BotConnection::new(stream))
    }
}

/// A running bot process.
pub struct TestBot {
    child: Child,
    _dir: TempDir,
}

impl TestBot {
    /// Plaintext config for a bot connecting to `port`.
    pub fn config(port: u16, channels: &str) -> String {
        format!(
            r#"
[twitch]
username = "countdownbot"
token = "oauth:integration-token"
channels = "{channels}"
host = "127.0.0.1"
port = {port}
tls = false

[timer]
interval = "5m"
"#
        )
    }

    /// Spawn the bot with the given config file contents and extra environment.
    pub fn spawn(config: &str, env: &[(&str, &str)]) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, config)?;

        let binary_path = PathBuf::from(env!("CARGO_BIN_EXE_chat-countdown"));
        let mut cmd = Command::new(&binary_path);
        cmd.arg(&config_path)
            .current_dir(dir.path())
            .env_remove("CHAT_COUNTDOWN_USERNAME")
            .env_remove("CHAT_COUNTDOWN_TOKEN")
            .env_remove("CHAT_COUNTDOWN_TIMERINTERVAL")
            .env_remove("CHAT_COUNTDOWN_CHANNELS")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in env {
            cmd.env(key, value);
        }

        Ok(Self {
            child: cmd.spawn()?,
            _dir: dir,
        })
    }

    /// Wait for the process to exit on its own.
    pub async fn wait_exit(&mut self, within: Duration) -> anyhow::Result<ExitStatus> {
        let step = Duration::from_millis(50);
        let mut waited = Duration::ZERO;
        while waited < within {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            sleep(step).await;
            waited += step;
        }
        anyhow::bail!("bot still running after {:?}", within)
    }
}

impl Drop for TestBot {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
