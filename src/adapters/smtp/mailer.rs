use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::ports::{Alert, AlertSink};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Alert sink that submits one authenticated TLS message per alert.
///
/// All recipients go into the To header of a single send; there is no
/// per-recipient fan-out.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        relay: &str,
        username: &str,
        password: &str,
        from: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        let from = from.parse::<Mailbox>()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl AlertSink for SmtpMailer {
    async fn deliver(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(alert.subject.as_str());
        for recipient in &alert.recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        let message = builder.body(alert.body.clone())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_from_address_is_rejected_at_construction() {
        assert!(SmtpMailer::new("smtp.gmail.com", "user", "secret", "not an address").is_err());
    }
}
