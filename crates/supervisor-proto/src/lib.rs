//! Supervisord event listener protocol.
//!
//! A listener announces `READY`, receives one header line followed by a
//! `len`-byte payload, and answers with `RESULT 2\nOK` or `RESULT 4\nFAIL`.
//! [`EventListenerCodec`] implements both directions as a
//! `tokio_util::codec` decoder/encoder pair.

pub mod codec;
pub mod error;
pub mod types;

pub use crate::{
    codec::{EventListenerCodec, MAX_HEADER_LEN, MAX_PAYLOAD_LEN},
    error::ProtocolError,
    types::{Header, Notification, Payload, Reply},
};
