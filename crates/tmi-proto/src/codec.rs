//! Tokio codecs: newline framing ([`LineCodec`]) and message framing ([`TmiCodec`]).

use std::fmt::Write;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::message::Message;
use crate::MAX_TMI_LINE_LEN;

/// Line-based codec that handles newline-terminated lines.
///
/// A line longer than the limit is reported once as
/// [`ProtocolError::MessageTooLong`] and then skipped up to its newline, so
/// decoding can continue with the next line.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Dropping the tail of an overlong line.
    discarding: bool,
}

impl LineCodec {
    /// Codec limited to [`MAX_TMI_LINE_LEN`] bytes per line.
    pub fn new() -> Self {
        Self::with_max_len(MAX_TMI_LINE_LEN)
    }

    /// Codec with a custom line length limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (true, Some(end)) => {
                    let _ = src.split_to(end + 1);
                    self.next_index = 0;
                    self.discarding = false;
                }
                (true, None) => {
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(end)) => {
                    let line = src.split_to(end + 1);
                    self.next_index = 0;

                    if line.len() > self.max_len {
                        return Err(ProtocolError::MessageTooLong {
                            actual: line.len(),
                            limit: self.max_len,
                        });
                    }

                    let data =
                        String::from_utf8(line.to_vec()).map_err(|e| ProtocolError::InvalidUtf8 {
                            byte_pos: e.utf8_error().valid_up_to(),
                        })?;

                    return Ok(Some(data));
                }
                (false, None) => {
                    if src.len() > self.max_len {
                        let actual = src.len();
                        src.clear();
                        self.next_index = 0;
                        self.discarding = true;
                        return Err(ProtocolError::MessageTooLong {
                            actual,
                            limit: self.max_len,
                        });
                    }

                    // remember where the scan stopped
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> Result<()> {
        dst.extend(msg.into_bytes());
        Ok(())
    }
}

/// Codec turning lines into [`Message`]s and back.
///
/// Blank lines are skipped on decode. A line that is too long, not UTF-8 or
/// not a valid message is yielded as an `Err` item: the line has already been
/// consumed, so the stream stays usable. Only I/O failures end decoding.
#[derive(Default)]
pub struct TmiCodec {
    inner: LineCodec,
}

impl TmiCodec {
    /// Codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }

    /// Serialize a message for the wire, refusing anything that would break framing.
    pub fn sanitize(msg: &Message) -> Result<String> {
        let mut data = String::new();
        write!(data, "{}", msg).map_err(|_| ProtocolError::IllegalControlChar('\n'))?;

        let body = data.trim_end_matches(['\r', '\n']);
        if let Some(ch) = body.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
            return Err(ProtocolError::IllegalControlChar(ch));
        }
        Ok(data)
    }
}

impl Decoder for TmiCodec {
    type Item = Result<Message>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Result<Message>>> {
        loop {
            let line = match self.inner.decode(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(
                    e @ (ProtocolError::MessageTooLong { .. } | ProtocolError::InvalidUtf8 { .. }),
                ) => return Ok(Some(Err(e))),
                Err(e) => return Err(e),
            };
            if line.trim_end_matches(['\r', '\n']).is_empty() {
                continue;
            }
            return Ok(Some(line.parse::<Message>()));
        }
    }
}

impl Encoder<Message> for TmiCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        let line = Self::sanitize(&msg)?;
        self.inner.encode(line, dst)
    }
}
