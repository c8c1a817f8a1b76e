use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    error::ProtocolError,
    types::{Header, Notification, Payload, Reply},
};

/// Longest header line accepted before the frame is rejected.
pub const MAX_HEADER_LEN: usize = 8 * 1024;

/// Largest payload accepted. Checked before any buffer space is reserved.
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

/// Incremental decoder for event frames and encoder for listener replies.
///
/// The decoder keeps a parsed header across calls while it waits for the
/// remainder of the payload.
#[derive(Debug, Default)]
pub struct EventListenerCodec {
    pending: Option<Header>,
}

impl EventListenerCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a header has been read and its payload is still incomplete.
    pub fn is_mid_frame(&self) -> bool {
        self.pending.is_some()
    }

    fn decode_header(src: &mut BytesMut) -> Result<Option<Header>, ProtocolError> {
        let Some(newline) = src.iter().position(|b| *b == b'\n') else {
            if src.len() > MAX_HEADER_LEN {
                src.clear();
                return Err(ProtocolError::HeaderTooLong {
                    limit: MAX_HEADER_LEN,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(newline + 1);
        if newline > MAX_HEADER_LEN {
            return Err(ProtocolError::HeaderTooLong {
                limit: MAX_HEADER_LEN,
            });
        }

        let text = std::str::from_utf8(&line[..newline])?;
        Header::parse(text.trim_end_matches('\r')).map(Some)
    }
}

impl Decoder for EventListenerCodec {
    type Item = Notification;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let header = match self.pending.take() {
            Some(header) => header,
            None => match Self::decode_header(src)? {
                Some(header) => header,
                None => return Ok(None),
            },
        };

        if header.len > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLong {
                len: header.len,
                limit: MAX_PAYLOAD_LEN,
            });
        }

        if src.len() < header.len {
            src.reserve(header.len - src.len());
            self.pending = Some(header);
            return Ok(None);
        }

        let body = src.split_to(header.len);
        let text = std::str::from_utf8(&body)?;
        let payload = Payload::parse(text)?;

        Ok(Some(Notification { header, payload }))
    }
}

impl Encoder<Reply> for EventListenerCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.put_slice(item.as_bytes());
        Ok(())
    }
}
