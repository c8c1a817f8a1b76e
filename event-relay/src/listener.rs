//! Supervisord event listener loop.
//!
//! Events are handled strictly one at a time: supervisord does not send the
//! next event until the listener has answered the previous one and announced
//! `READY` again.

use bytes::BytesMut;
use supervisor_proto::{EventListenerCodec, Notification, Reply};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::event::ProcessEvent;

const READ_BUFFER_CAPACITY: usize = 4 * 1024;

/// Reads events from supervisord and forwards watched ones.
pub struct EventListener {
    dispatcher: Dispatcher,
    hostname: String,
    codec: EventListenerCodec,
}

impl EventListener {
    pub fn new(dispatcher: Dispatcher, hostname: impl Into<String>) -> Self {
        Self {
            dispatcher,
            hostname: hostname.into(),
            codec: EventListenerCodec::new(),
        }
    }

    /// Run until `reader` reaches end of input.
    ///
    /// Delivery failures are logged and the event is still acknowledged, so
    /// supervisord does not redeliver it. Frames that cannot be decoded are
    /// answered with `FAIL`.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = BytesMut::with_capacity(READ_BUFFER_CAPACITY);
        self.reply(&mut writer, &[Reply::Ready]).await?;

        loop {
            match self.codec.decode(&mut buf) {
                Ok(Some(notification)) => {
                    self.handle(&notification).await;
                    self.reply(&mut writer, &[Reply::Ok, Reply::Ready]).await?;
                }
                Ok(None) => {
                    if reader.read_buf(&mut buf).await? == 0 {
                        if !buf.is_empty() || self.codec.is_mid_frame() {
                            warn!(buffered = buf.len(), "Input closed in the middle of an event");
                        }
                        info!("Event stream closed");
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Rejecting undecodable event");
                    self.reply(&mut writer, &[Reply::Fail, Reply::Ready]).await?;
                }
            }
        }
    }

    async fn handle(&self, notification: &Notification) {
        let event = ProcessEvent::from_notification(notification, &self.hostname);
        debug!(
            kind = %event.kind,
            serial = event.serial,
            process = event.process_name.as_deref().unwrap_or("-"),
            "Received event"
        );

        match self.dispatcher.dispatch(&event).await {
            Ok(DispatchOutcome::Delivered) => info!(
                kind = %event.kind,
                process = event.process_name.as_deref().unwrap_or("-"),
                channel = self.dispatcher.notifier().channel_type(),
                "Notification delivered"
            ),
            Ok(DispatchOutcome::Skipped) => {}
            Err(e) => error!(
                kind = %event.kind,
                process = event.process_name.as_deref().unwrap_or("-"),
                channel = self.dispatcher.notifier().channel_type(),
                error = %e,
                "Notification delivery failed"
            ),
        }
    }

    async fn reply<W>(&mut self, writer: &mut W, replies: &[Reply]) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut out = BytesMut::new();
        for reply in replies {
            self.codec.encode(*reply, &mut out)?;
        }
        writer.write_all(&out).await?;
        writer.flush().await?;
        Ok(())
    }
}
