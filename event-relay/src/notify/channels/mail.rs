//! Email notification channel using SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use crate::Result;
use crate::config::{MailConfig, TransportConfig};
use crate::event::ProcessEvent;
use crate::notify::Notifier;

/// Port on which the server expects TLS from the first byte.
const SMTPS_PORT: u16 = 465;

/// Email notification channel.
pub struct MailChannel {
    config: MailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl MailChannel {
    /// Create a new mail channel.
    ///
    /// Port 465 uses implicit TLS; any other port upgrades with STARTTLS when
    /// the server offers it.
    pub fn new(config: MailConfig, transport: &TransportConfig) -> Result<Self> {
        let tls_parameters = TlsParameters::new(config.host.clone())?;
        let tls = if config.port == SMTPS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let smtp = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .tls(tls)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .timeout(Some(transport.timeout))
            .build();

        Ok(Self {
            config,
            transport: smtp,
        })
    }

    /// Build the plain-text message for an event.
    fn build_message(&self, event: &ProcessEvent) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.config.from.clone())
            .subject(event.title())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.config.recipients {
            builder = builder.to(recipient.clone());
        }
        Ok(builder.body(event.to_string())?)
    }
}

#[async_trait]
impl Notifier for MailChannel {
    fn channel_type(&self) -> &'static str {
        "mail"
    }

    async fn send(&self, event: &ProcessEvent) -> Result<()> {
        let message = self.build_message(event)?;

        if let Err(e) = self.transport.send(message).await {
            warn!(
                host = %self.config.host,
                port = self.config.port,
                error = %e,
                "Mail delivery failed"
            );
            return Err(e.into());
        }

        debug!(
            recipients = self.config.recipients.len(),
            "Mail notification sent: {}", event.kind
        );
        Ok(())
    }
}
