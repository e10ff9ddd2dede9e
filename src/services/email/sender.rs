// Email delivery transports
// The service renders messages; a `MailTransport` gets them to the recipient.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use tracing::{error, info, instrument};

use super::types::{EmailError, EmailMessage, ResendEmailPayload};
use crate::app_config::{EmailConfig, EmailProvider};

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message. No retries: failures go straight back to the caller.
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;

    fn name(&self) -> &'static str;
}

/// Pick the transport configured by `EMAIL_PROVIDER`
pub fn transport_from_config(config: &EmailConfig) -> Result<Arc<dyn MailTransport>, EmailError> {
    let transport: Arc<dyn MailTransport> = match config.provider {
        EmailProvider::Resend => Arc::new(ResendTransport::new(
            config.resend_api_key.clone(),
            config.resend_api_url.clone(),
        )),
        EmailProvider::Smtp => Arc::new(SmtpTransport::from_config(config)?),
        EmailProvider::Log => Arc::new(LogTransport),
    };
    Ok(transport)
}

/// Resend HTTP API
#[derive(Clone)]
pub struct ResendTransport {
    client: Arc<Client>,
    api_key: String,
    api_url: String,
}

impl ResendTransport {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let payload: ResendEmailPayload = message.into();

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Email sent successfully");
                Ok(())
            },
            Ok(res) => {
                let status = res.status();
                let error_text = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                error!(%status, error = %error_text, "Failed to send email");

                if status.as_u16() == 429 {
                    Err(EmailError::RateLimitExceeded)
                } else if status.is_server_error() {
                    Err(EmailError::ServiceUnavailable)
                } else {
                    Err(EmailError::SendError(format!(
                        "Email send failed with status {}: {}",
                        status, error_text
                    )))
                }
            },
            Err(e) => {
                error!(error = ?e, "Network error while sending email");
                Err(EmailError::SendError(format!("Network error: {}", e)))
            },
        }
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

/// SMTP relay through lettre
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn from_config(config: &EmailConfig) -> Result<Self, EmailError> {
        let host = config.smtp_host.as_str();
        let builder = if matches!(host, "localhost" | "127.0.0.1") {
            // Local catch-all servers (mailhog, mailpit) speak plain SMTP
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        } else if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| EmailError::ConfigError(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| EmailError::ConfigError(e.to_string()))?
        };

        let mut builder = builder.port(config.smtp_port);
        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
        })
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, EmailError> {
    raw.parse::<Mailbox>()
        .map_err(|e| EmailError::InvalidEmail(format!("{}: {}", raw, e)))
}

/// Convert to a lettre message, multipart when a text body is present
pub fn to_lettre_message(message: &EmailMessage) -> Result<Message, EmailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&message.from)?)
        .subject(message.subject.clone());

    for to in &message.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    let built = match &message.text {
        Some(text) => builder.multipart(MultiPart::alternative_plain_html(
            text.clone(),
            message.html.clone(),
        )),
        None => builder.singlepart(SinglePart::html(message.html.clone())),
    };

    built.map_err(|e| EmailError::SendError(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let email = to_lettre_message(&message)?;

        match self.mailer.send(email).await {
            Ok(_) => {
                info!("Email sent successfully");
                Ok(())
            },
            Err(e) => {
                error!(error = %e, "SMTP delivery failed");
                Err(EmailError::SendError(e.to_string()))
            },
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Logs instead of delivering. For local development.
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = ?message.to,
            subject = %message.subject,
            body = message.text.as_deref().unwrap_or(""),
            "Email delivery disabled; message logged"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Keeps sent messages in memory so callers can inspect them
#[derive(Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Most recent message addressed to `to`
    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.messages()
            .into_iter()
            .rev()
            .find(|m| m.to.iter().any(|addr| addr == to))
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent
            .lock()
            .map_err(|_| EmailError::SendError("mailbox lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
