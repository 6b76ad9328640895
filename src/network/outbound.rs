//! Outbound reply queue.
//!
//! Handlers push replies without waiting; the session task drains the queue
//! onto the wire once logged in.

use tmi_proto::Message;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use crate::handlers::ReplySink;

/// Default number of replies buffered before new ones are dropped.
pub const OUTBOUND_CAPACITY: usize = 256;

/// Cloneable handle for queuing `PRIVMSG` replies.
#[derive(Clone)]
pub struct OutboundQueue {
    tx: mpsc::Sender<Message>,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl ReplySink for OutboundQueue {
    fn say(&self, channel: &str, text: &str) {
        let msg = Message::privmsg(format!("#{channel}"), text);
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(channel = %channel, "Outbound queue full, dropping reply");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(channel = %channel, "Outbound queue closed, dropping reply");
            }
        }
    }
}
