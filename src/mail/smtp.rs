//! SMTP delivery through `lettre`.

use futures_util::future::{BoxFuture, FutureExt};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use crate::config::{MailConfig, SmtpSecurity};
use crate::mail::transport::{MailTransport, MessageId, OutboundMail, TransportError};

/// Async SMTP client; one connection per message.
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    /// Right-hand side of generated Message-IDs.
    id_domain: String,
}

impl SmtpTransport {
    /// Build a transport from the mail section of the config.
    ///
    /// No connection is made here; each send dials the server.
    pub fn from_config(config: &MailConfig) -> Result<Self, TransportError> {
        let host = config.smtp_host.as_str();
        let builder = match config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| TransportError::Smtp(e.to_string()))?,
            SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| TransportError::Smtp(e.to_string()))?,
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let builder = builder
            .port(config.smtp_port)
            .timeout(Some(config.timeout()));
        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        };

        let id_domain = config
            .username
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_string())
            .unwrap_or_else(|| "localhost".to_string());

        Ok(Self {
            inner: builder.build(),
            id_domain,
        })
    }

    fn build_message(&self, mail: &OutboundMail, id: &MessageId) -> Result<Message, TransportError> {
        let from = Mailbox::new(Some(mail.from_name.clone()), parse_address(&mail.from_address)?);
        let to = Mailbox::new(None, parse_address(&mail.to)?);

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.clone())
            .message_id(Some(id.0.clone()))
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &mail.reply_to {
            builder = builder.reply_to(Mailbox::new(None, parse_address(reply_to)?));
        }

        builder
            .body(mail.html_body.clone())
            .map_err(|e| TransportError::Build(e.to_string()))
    }
}

fn parse_address(address: &str) -> Result<Address, TransportError> {
    address.parse().map_err(|e: lettre::address::AddressError| TransportError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

impl MailTransport for SmtpTransport {
    fn send<'a>(&'a self, mail: &'a OutboundMail) -> BoxFuture<'a, Result<MessageId, TransportError>> {
        async move {
            let id = MessageId(format!("<{}@{}>", Uuid::new_v4(), self.id_domain));
            let message = self.build_message(mail, &id)?;

            let response = self
                .inner
                .send(message)
                .await
                .map_err(|e| TransportError::Smtp(e.to_string()))?;

            tracing::debug!(
                message_id = %id,
                code = %response.code(),
                "SMTP server accepted message"
            );
            Ok(id)
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
