use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use hostel_core::domain::DeliveryError;
use hostel_core::services::notification::EmailSender;
use hostel_shared::config::EmailSettings;
use hostel_shared::utils::mask_email;

/// Plain-text email over authenticated SMTP (STARTTLS/TLS relay).
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(settings: &EmailSettings) -> anyhow::Result<Self> {
        let from: Mailbox = settings.from_address.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?.port(settings.smtp_port);
        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(settings.username.clone(), settings.password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn compose(&self, to: &str, subject: &str, body: &str) -> Result<Message, DeliveryError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| DeliveryError::InvalidRecipient(e.to_string()))?;

        Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::InvalidRecipient(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let message = self.compose(to, subject, body)?;

        match self.transport.send(message).await {
            Ok(_) => {
                debug!("Email delivered to {}", mask_email(to));
                Ok(())
            }
            Err(e) if e.is_permanent() => {
                warn!("SMTP server rejected email to {}: {}", mask_email(to), e);
                Err(DeliveryError::Rejected(e.to_string()))
            }
            Err(e) => {
                warn!("SMTP delivery to {} failed: {}", mask_email(to), e);
                Err(DeliveryError::Transport(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EmailSettings {
        EmailSettings {
            enabled: true,
            smtp_host: "smtp.example.test".to_string(),
            smtp_port: 587,
            username: "mailer".to_string(),
            password: "secret".to_string(),
            from_address: "Hostel Office <office@example.test>".to_string(),
        }
    }

    #[tokio::test]
    async fn malformed_recipient_is_reported_without_connecting() {
        let sender = SmtpEmailSender::new(&settings()).unwrap();
        let err = sender.send("not-an-address", "Subject", "Body").await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidRecipient(_)));
    }

    #[tokio::test]
    async fn composes_plain_text_message() {
        let sender = SmtpEmailSender::new(&settings()).unwrap();
        let message = sender.compose("amina@students.test", "Payment receipt #4", "Thanks").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Payment receipt #4"));
        assert!(raw.contains("To: amina@students.test"));
        assert!(raw.contains("Thanks"));
    }

    #[test]
    fn invalid_sender_address_fails_construction() {
        let mut bad = settings();
        bad.from_address = "nobody".to_string();
        assert!(SmtpEmailSender::new(&bad).is_err());
    }
}
