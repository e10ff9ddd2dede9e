// Email Service Module
// Orchestrates template builders and the configured delivery transport

pub mod builders;
pub mod sender;
pub mod types;

use self::types::EmailBuilder;
use crate::app_config::EmailConfig;
use builders::{PasswordResetEmailBuilder, VerificationEmailBuilder};
use handlebars::Handlebars;
use sender::MailTransport;
use std::sync::Arc;
use tracing::{info, instrument};

/// Email service for verification and password reset mail
#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn MailTransport>,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    /// Build with the transport selected by `config.provider`
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let transport = sender::transport_from_config(&config)?;
        Self::with_transport(config, transport)
    }

    /// Build with an explicit transport
    pub fn with_transport(
        config: EmailConfig,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, EmailError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(true);
        Self::register_templates(&mut templates)?;

        info!(transport = transport.name(), "Email service initialized");

        Ok(Self {
            transport,
            config,
            templates: Arc::new(templates),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), EmailError> {
        let verify_template = include_str!("../../templates/email/verify_email.html");
        templates
            .register_template_string("verify_email", verify_template)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let password_reset_template = include_str!("../../templates/email/password_reset.html");
        templates
            .register_template_string("password_reset", password_reset_template)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Send the sign-up verification link
    #[instrument(skip(self, token))]
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        user_name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let message = VerificationEmailBuilder::new(
            to_email,
            user_name,
            token,
            &self.config,
            &self.templates,
        )
        .build()?;

        self.transport.send(message).await
    }

    /// Send a password reset link valid for `expiry_minutes`
    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        user_name: &str,
        reset_token: &str,
        expiry_minutes: i64,
    ) -> Result<(), EmailError> {
        let message = PasswordResetEmailBuilder::new(
            to_email,
            user_name,
            reset_token,
            expiry_minutes,
            &self.config,
            &self.templates,
        )
        .build()?;

        self.transport.send(message).await
    }
}

// Re-export commonly used types for convenience
pub use sender::{LogTransport, MemoryTransport};
pub use types::{EmailError, EmailMessage};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::EmailProvider;

    fn create_test_config() -> EmailConfig {
        EmailConfig {
            provider: EmailProvider::Log,
            resend_api_key: String::new(),
            resend_api_url: "https://api.resend.com/emails".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@test.com".to_string(),
            from_name: "Test Jobs".to_string(),
            support_email: "support@test.com".to_string(),
            frontend_url: "https://app.test.com".to_string(),
        }
    }

    #[test]
    fn test_email_service_creation() {
        assert!(EmailService::new(create_test_config()).is_ok());
    }

    #[tokio::test]
    async fn test_verification_email_contains_link() {
        let mailbox = MemoryTransport::new();
        let service =
            EmailService::with_transport(create_test_config(), Arc::new(mailbox.clone())).unwrap();

        service
            .send_verification_email("ann@test.com", "Ann", "abc123")
            .await
            .unwrap();

        let sent = mailbox.last_to("ann@test.com").expect("message recorded");
        assert!(sent.html.contains("https://app.test.com/verify-email/abc123"));
        assert!(sent
            .text
            .as_deref()
            .unwrap_or_default()
            .contains("https://app.test.com/verify-email/abc123"));
        assert_eq!(sent.from, "Test Jobs <noreply@test.com>");
    }

    #[tokio::test]
    async fn test_reset_email_contains_link_and_expiry() {
        let mailbox = MemoryTransport::new();
        let service =
            EmailService::with_transport(create_test_config(), Arc::new(mailbox.clone())).unwrap();

        service
            .send_password_reset_email("ann@test.com", "Ann", "feed", 60)
            .await
            .unwrap();

        let sent = mailbox.last_to("ann@test.com").unwrap();
        assert!(sent.html.contains("https://app.test.com/reset-password/feed"));
        assert!(sent.html.contains("60 minutes"));
    }
}
