//! Chat server session driver.
//!
//! One [`TmiClient`] keeps a single logged-in connection alive: it connects,
//! optionally upgrades to TLS, logs in, joins the configured channels and
//! then shuttles lines both ways. Every channel `PRIVMSG` is handed to the
//! [`Router`] on its own task; replies come back through the outbound queue.
//! Dropped connections and server `RECONNECT`s are retried with exponential
//! backoff. Only a rejected login ends [`TmiClient::run`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tmi_proto::{ChatMessage, Command, Message, TmiCodec};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, sleep_until, timeout};
use tokio_rustls::rustls::ClientConfig;
use tokio_util::codec::Framed;
use tracing::{Instrument, debug, error, info, trace, warn};

use super::outbound::{OUTBOUND_CAPACITY, OutboundQueue};
use super::stream::ClientStream;
use super::tls::{native_client_config, upgrade_to_tls};
use crate::config::TwitchConfig;
use crate::error::ClientError;
use crate::handlers::{Outcome, Router};
use crate::telemetry::spans;

const CAPABILITIES: &[&str] = &["twitch.tv/tags", "twitch.tv/commands"];
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const WELCOME_TIMEOUT: Duration = Duration::from_secs(30);
const RPL_WELCOME: u16 = 1;

/// `NOTICE` texts the server sends when it rejects the credentials.
const LOGIN_FAILURES: &[&str] = &[
    "Login authentication failed",
    "Login unsuccessful",
    "Improperly formatted auth",
    "Invalid NICK",
];

/// Reconnect delays: 1s doubling up to 60s.
#[derive(Debug)]
pub struct Backoff {
    current: Duration,
    initial: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial,
            initial,
            max,
        }
    }

    /// Delay before the next attempt; doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

type Connection = Framed<ClientStream, TmiCodec>;

/// Chat connection owner.
pub struct TmiClient {
    config: TwitchConfig,
    router: Arc<Router>,
    queue: OutboundQueue,
    outbound: mpsc::Receiver<Message>,
    tls_config: Option<Arc<ClientConfig>>,
    backoff: Backoff,
}

impl TmiClient {
    pub fn new(config: TwitchConfig, router: Arc<Router>) -> Self {
        let (queue, outbound) = OutboundQueue::new(OUTBOUND_CAPACITY);
        Self {
            config,
            router,
            queue,
            outbound,
            tls_config: None,
            backoff: Backoff::default(),
        }
    }

    /// Replace the reconnect schedule.
    #[cfg(test)]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Keep a session running until login is rejected.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        loop {
            let span = spans::session(&self.config.host, self.config.port(), self.config.tls);
            let mut logged_in = false;

            let err = match self.session(&mut logged_in).instrument(span).await {
                Ok(()) => ClientError::Closed,
                Err(e) => e,
            };

            if !err.is_retryable() {
                error!(error = %err, "Login rejected, giving up");
                return Err(err);
            }

            if logged_in {
                self.backoff.reset();
            }
            let delay = self.backoff.next_delay();
            warn!(
                error = %err,
                kind = err.error_code(),
                delay_ms = delay.as_millis() as u64,
                "Disconnected from chat, reconnecting"
            );
            sleep(delay).await;
        }
    }

    async fn connect(&mut self) -> Result<Connection, ClientError> {
        let addr = (self.config.host.as_str(), self.config.port());
        let tcp = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout("connect"))??;
        tcp.set_nodelay(true)?;

        let stream = if self.config.tls {
            let tls_config = match &self.tls_config {
                Some(config) => config.clone(),
                None => {
                    let config = Arc::new(native_client_config()?);
                    self.tls_config = Some(config.clone());
                    config
                }
            };
            let tls = timeout(
                CONNECT_TIMEOUT,
                upgrade_to_tls(tcp, &self.config.host, tls_config),
            )
            .await
            .map_err(|_| ClientError::Timeout("TLS handshake"))??;
            ClientStream::Tls(Box::new(tls))
        } else {
            ClientStream::Plain(tcp)
        };

        debug!(tls = stream.is_tls(), "Connected");
        Ok(Framed::new(stream, TmiCodec::new()))
    }

    async fn login(&self, conn: &mut Connection) -> Result<(), ClientError> {
        conn.send(Message::cap_req(CAPABILITIES)).await?;
        conn.send(Message::pass(self.config.token.pass_value()))
            .await?;
        conn.send(Message::nick(self.config.username.to_lowercase()))
            .await?;
        Ok(())
    }

    async fn session(&mut self, logged_in: &mut bool) -> Result<(), ClientError> {
        let mut conn = self.connect().await?;
        self.login(&mut conn).await?;

        let welcome_deadline = Instant::now() + WELCOME_TIMEOUT;

        loop {
            tokio::select! {
                inbound = conn.next() => {
                    let Some(frame) = inbound else {
                        return Ok(());
                    };
                    match frame? {
                        Ok(msg) => self.handle_inbound(msg, &mut conn, logged_in).await?,
                        Err(e) => warn!(error = %e, "Skipping unreadable line"),
                    }
                }
                Some(reply) = self.outbound.recv(), if *logged_in => {
                    if let Err(e) = TmiCodec::sanitize(&reply) {
                        warn!(error = %e, "Dropping unsendable reply");
                        continue;
                    }
                    conn.send(reply).await?;
                }
                _ = sleep_until(welcome_deadline), if !*logged_in => {
                    return Err(ClientError::Timeout("welcome"));
                }
            }
        }
    }

    async fn handle_inbound(
        &self,
        msg: Message,
        conn: &mut Connection,
        logged_in: &mut bool,
    ) -> Result<(), ClientError> {
        match &msg.command {
            Command::PING(server, server2) => {
                conn.send(Message::pong(server.clone(), server2.clone()))
                    .await?;
            }
            Command::Response(RPL_WELCOME, _) => {
                *logged_in = true;
                info!(username = %self.config.username, "Logged in");
                let channels = self.config.channels.as_slice();
                if channels.is_empty() {
                    warn!("No channels configured, nothing to join");
                } else {
                    conn.send(Message::join(channels)).await?;
                }
            }
            Command::RECONNECT => return Err(ClientError::Reconnect),
            Command::NOTICE(_, text) if LOGIN_FAILURES.iter().any(|f| text.starts_with(f)) => {
                return Err(ClientError::AuthFailed(text.clone()));
            }
            Command::NOTICE(target, text) => {
                info!(target = %target, text = %text, "Server notice");
            }
            Command::JOIN(channel) if self.is_self(&msg) => {
                info!(channel = %channel, "Joined channel");
            }
            Command::PART(channel) if self.is_self(&msg) => {
                warn!(channel = %channel, "Removed from channel");
            }
            Command::PRIVMSG(..) => {
                if let Some(chat) = ChatMessage::from_message(&msg) {
                    self.spawn_route(chat);
                }
            }
            _ => trace!(command = %msg.command.name(), "Ignoring message"),
        }
        Ok(())
    }

    fn is_self(&self, msg: &Message) -> bool {
        msg.source_nickname()
            .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.config.username))
    }

    fn spawn_route(&self, chat: ChatMessage) {
        let router = Arc::clone(&self.router);
        let queue = self.queue.clone();
        tokio::spawn(async move {
            match router.route(&chat, &queue) {
                Outcome::Ignored => {}
                outcome => debug!(channel = %chat.channel, ?outcome, "Routed chat message"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthToken, BotConfig, ChannelList};
    use crate::state::ChannelRegistry;
    use chrono::TimeDelta;
    use tmi_proto::LineCodec;
    use tokio::net::TcpListener;

    #[test]
    fn backoff_doubles_to_cap_and_resets() {
        let mut backoff = Backoff::default();
        let delays: Vec<u64> = (0..8).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 60, 60]);
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    fn test_client(port: u16) -> TmiClient {
        let config = TwitchConfig {
            username: "CountdownBot".to_string(),
            token: AuthToken::new("sekrit"),
            channels: ChannelList::new(["streamer"]),
            host: "127.0.0.1".to_string(),
            port: Some(port),
            tls: false,
        };
        let router = Router::new(
            "countdownbot",
            &BotConfig::default(),
            TimeDelta::minutes(5),
            Arc::new(ChannelRegistry::new()),
        );
        TmiClient::new(config, Arc::new(router)).with_backoff(Backoff::new(
            Duration::from_millis(10),
            Duration::from_millis(50),
        ))
    }

    async fn expect_line(server: &mut Framed<TcpStream, LineCodec>) -> String {
        let line = timeout(Duration::from_secs(5), server.next())
            .await
            .expect("timed out waiting for client line")
            .expect("client hung up")
            .unwrap();
        line.trim_end().to_string()
    }

    #[tokio::test]
    async fn logs_in_joins_and_answers_commands() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut client = test_client(port);
        let handle = tokio::spawn(async move { client.run().await });

        let (socket, _) = listener.accept().await.unwrap();
        let mut server = Framed::new(socket, LineCodec::new());

        assert_eq!(
            expect_line(&mut server).await,
            "CAP REQ :twitch.tv/tags twitch.tv/commands"
        );
        assert_eq!(expect_line(&mut server).await, "PASS oauth:sekrit");
        assert_eq!(expect_line(&mut server).await, "NICK countdownbot");

        server
            .send(":tmi.twitch.tv 001 countdownbot :Welcome, GLHF!\r\n".to_string())
            .await
            .unwrap();
        assert_eq!(expect_line(&mut server).await, "JOIN #streamer");

        server
            .send("PING :tmi.twitch.tv\r\n".to_string())
            .await
            .unwrap();
        assert_eq!(expect_line(&mut server).await, "PONG :tmi.twitch.tv");

        server
            .send(
                "@display-name=Viewer;tmi-sent-ts=1700000000000 :viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #streamer :@countdownbot timeleft\r\n"
                    .to_string(),
            )
            .await
            .unwrap();
        assert_eq!(
            expect_line(&mut server).await,
            "PRIVMSG #streamer :@Viewer: timer hasn't been initialized yet!"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn malformed_lines_keep_session_alive() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut client = test_client(port);
        let handle = tokio::spawn(async move { client.run().await });

        let (socket, _) = listener.accept().await.unwrap();
        let mut server = Framed::new(socket, LineCodec::new());
        for _ in 0..3 {
            expect_line(&mut server).await;
        }
        server
            .send(":tmi.twitch.tv 001 countdownbot :Welcome, GLHF!\r\n".to_string())
            .await
            .unwrap();
        assert_eq!(expect_line(&mut server).await, "JOIN #streamer");

        let overlong = format!(":tmi.twitch.tv NOTICE #streamer :{}\r\n", "x".repeat(9000));
        server.send(":tmi.twitch.tv PRIVMSG\r\n".to_string()).await.unwrap();
        server.send(overlong).await.unwrap();
        server
            .send("PING :still-here\r\n".to_string())
            .await
            .unwrap();
        assert_eq!(expect_line(&mut server).await, "PONG :still-here");

        // Still the first connection.
        assert!(
            timeout(Duration::from_millis(200), listener.accept())
                .await
                .is_err()
        );
        handle.abort();
    }

    #[tokio::test]
    async fn reconnects_after_server_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut client = test_client(port);
        let handle = tokio::spawn(async move { client.run().await });

        for _ in 0..2 {
            let (socket, _) = listener.accept().await.unwrap();
            let mut server = Framed::new(socket, LineCodec::new());
            assert!(expect_line(&mut server).await.starts_with("CAP REQ"));
            server
                .send(":tmi.twitch.tv RECONNECT\r\n".to_string())
                .await
                .unwrap();
        }

        handle.abort();
    }

    #[tokio::test]
    async fn rejected_login_is_fatal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut client = test_client(port);
        let handle = tokio::spawn(async move { client.run().await });

        let (socket, _) = listener.accept().await.unwrap();
        let mut server = Framed::new(socket, LineCodec::new());
        for _ in 0..3 {
            expect_line(&mut server).await;
        }
        server
            .send(":tmi.twitch.tv NOTICE * :Login authentication failed\r\n".to_string())
            .await
            .unwrap();

        let result = timeout(Duration::from_secs(5), handle)
            .await
            .expect("client should stop")
            .unwrap();
        assert!(matches!(result, Err(ClientError::AuthFailed(_))));
    }
}
