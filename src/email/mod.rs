use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tokio::sync::Mutex;

use crate::{
    config::EmailConfig,
    error::{AppError, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

/// Picks SMTP when configured, otherwise logs outgoing mail.
pub fn sender_from_config(config: Option<&EmailConfig>) -> Result<Arc<dyn EmailSender>> {
    match config {
        Some(cfg) => Ok(Arc::new(SmtpEmailSender::new(cfg)?)),
        None => Ok(Arc::new(LogEmailSender)),
    }
}

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Internal(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::External(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}

/// Development sender: writes the message to the log.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email (not sent, SMTP disabled):\n{}", email.body);
        Ok(())
    }
}

/// Keeps sent mail in memory so tests can read reset links.
#[derive(Default)]
pub struct MemoryEmailSender {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl EmailSender for MemoryEmailSender {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}
