//! Server side of one bot connection.
//!
//! Reads the lines the bot sends and writes TMI lines back to it.

use std::time::Duration;
use tmi_proto::{Command, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A connected bot, seen from the fake server.
pub struct BotConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl BotConnection {
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        }
    }

    /// Send a raw TMI line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line from the bot (without the line ending).
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_line_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("bot closed the connection");
        }
        Ok(line.trim_end().to_string())
    }

    /// Receive and parse one message.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        let line = self.recv_line().await?;
        line.parse::<Message>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Read the login burst and answer with a welcome.
    ///
    /// Returns the `PASS` and `NICK` values the bot sent.
    pub async fn accept_login(&mut self) -> anyhow::Result<(String, String)> {
        let mut pass = None;
        let mut nick = None;
        while pass.is_none() || nick.is_none() {
            match self.recv().await?.command {
                Command::PASS(p) => pass = Some(p),
                Command::NICK(n) => nick = Some(n),
                Command::CAP(_) => {}
                other => anyhow::bail!("unexpected command during login: {:?}", other),
            }
        }
        let nick = nick.unwrap_or_default();
        self.send_raw(&format!(":tmi.twitch.tv 001 {nick} :Welcome, GLHF!"))
            .await?;
        Ok((pass.unwrap_or_default(), nick))
    }

    /// Deliver a channel message from `user` with the usual tags.
    pub async fn chat(
        &mut self,
        channel: &str,
        user: &str,
        display_name: &str,
        sent_ms: i64,
        text: &str,
    ) -> anyhow::Result<()> {
        self.send_raw(&format!(
            "@display-name={display_name};mod=0;room-id=1;tmi-sent-ts={sent_ms};user-id=2;user-type= :{user}!{user}@{user}.tmi.twitch.tv PRIVMSG #{channel} :{text}"
        ))
        .await
    }

    /// Wait for the next `PRIVMSG` and return `(target, text)`.
    pub async fn expect_privmsg(&mut self) -> anyhow::Result<(String, String)> {
        loop {
            if let Command::PRIVMSG(target, text) = self.recv().await?.command {
                return Ok((target, text));
            }
        }
    }
}
