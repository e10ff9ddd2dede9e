// Email Builders - each builder knows how to construct its specific email type

use super::types::{
    EmailBuilder, EmailError, EmailMessage, PasswordResetEmailData, VerificationEmailData,
};
use crate::app_config::EmailConfig;
use handlebars::Handlebars;
use tracing::instrument;

fn sender_address(config: &EmailConfig) -> String {
    format!("{} <{}>", config.from_name, config.from_email)
}

/// `{FRONTEND_URL}/verify-email/{token}`
pub fn verification_link(config: &EmailConfig, token: &str) -> String {
    format!("{}/verify-email/{}", config.frontend_url, token)
}

/// `{FRONTEND_URL}/reset-password/{token}`
pub fn reset_link(config: &EmailConfig, token: &str) -> String {
    format!("{}/reset-password/{}", config.frontend_url, token)
}

/// Builder for sign-up verification emails
pub struct VerificationEmailBuilder<'a> {
    to_email: &'a str,
    user_name: &'a str,
    token: &'a str,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> VerificationEmailBuilder<'a> {
    pub fn new(
        to_email: &'a str,
        user_name: &'a str,
        token: &'a str,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            to_email,
            user_name,
            token,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for VerificationEmailBuilder<'a> {
    #[instrument(skip(self), fields(to = %self.to_email))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = VerificationEmailData {
            verify_url: verification_link(self.config, self.token),
            user_name: self.user_name.to_string(),
            user_email: self.to_email.to_string(),
            app_name: self.config.from_name.clone(),
            support_email: self.config.support_email.clone(),
        };

        let html = self
            .templates
            .render("verify_email", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            Please verify your email address by opening this link:\n{}\n\n\
            You will not be able to sign in until your email is verified.\n\n\
            The {} Team",
            self.user_name, data.verify_url, self.config.from_name
        );

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.to_email.to_string()],
            format!("Verify your {} account", self.config.from_name),
            html,
        )
        .with_text(text)
        .with_reply_to(self.config.support_email.clone()))
    }
}

/// Builder for password reset emails
pub struct PasswordResetEmailBuilder<'a> {
    to_email: &'a str,
    user_name: &'a str,
    reset_token: &'a str,
    expiry_minutes: i64,
    config: &'a EmailConfig,
    templates: &'a Handlebars<'a>,
}

impl<'a> PasswordResetEmailBuilder<'a> {
    pub fn new(
        to_email: &'a str,
        user_name: &'a str,
        reset_token: &'a str,
        expiry_minutes: i64,
        config: &'a EmailConfig,
        templates: &'a Handlebars<'a>,
    ) -> Self {
        Self {
            to_email,
            user_name,
            reset_token,
            expiry_minutes,
            config,
            templates,
        }
    }
}

impl<'a> EmailBuilder for PasswordResetEmailBuilder<'a> {
    #[instrument(skip(self), fields(to = %self.to_email))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let data = PasswordResetEmailData {
            reset_url: reset_link(self.config, self.reset_token),
            user_name: self.user_name.to_string(),
            app_name: self.config.from_name.clone(),
            support_email: self.config.support_email.clone(),
            expiry_minutes: self.expiry_minutes,
        };

        let html = self
            .templates
            .render("password_reset", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            Reset your password here (valid for {} minutes):\n{}\n\n\
            If you did not request a reset, ignore this email.\n\n\
            The {} Team",
            self.user_name, self.expiry_minutes, data.reset_url, self.config.from_name
        );

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.to_email.to_string()],
            format!("Reset your {} password", self.config.from_name),
            html,
        )
        .with_text(text))
    }
}
