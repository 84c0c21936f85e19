//! Email delivery over SMTP.

use arcana_common::{config::EmailConfig, AppError, AppResult};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

/// Email service.
///
/// When the service is disabled in configuration, sends become no-ops so
/// the account flows keep working in development setups without SMTP.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
    frontend_url: String,
}

impl EmailService {
    /// Create an email service from configuration.
    pub fn new(config: &EmailConfig, frontend_url: &str) -> AppResult<Self> {
        if !config.enabled {
            return Ok(Self::disabled(frontend_url));
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Email(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: Some(builder.build()),
            from_address: config.from_address.clone(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a disabled email service.
    #[must_use]
    pub fn disabled(frontend_url: &str) -> Self {
        Self {
            transport: None,
            from_address: String::new(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Whether email delivery is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send a plain-text email.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let Some(transport) = &self.transport else {
            debug!(to, subject, "Email delivery disabled, skipping send");
            return Ok(());
        };

        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid from address: {e}")))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| AppError::Email(format!("Invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Email(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Email(e.to_string()))?;

        info!(to, subject, "Sent email");
        Ok(())
    }

    /// Send the email address verification message.
    pub async fn send_verification(&self, to: &str, token: &str) -> AppResult<()> {
        let link = format!("{}/verify-email?token={token}", self.frontend_url);
        let body = format!(
            "Welcome to Arcana!\n\n\
            Please confirm your email address by opening the link below:\n\n\
            {link}\n\n\
            If you did not create an account, you can ignore this message.\n"
        );
        self.send(to, "Confirm your email address", &body).await
    }

    /// Send the password reset message.
    pub async fn send_password_reset(&self, to: &str, token: &str) -> AppResult<()> {
        let link = format!("{}/reset-password?token={token}", self.frontend_url);
        let body = format!(
            "A password reset was requested for your Arcana account.\n\n\
            Open the link below to choose a new password:\n\n\
            {link}\n\n\
            The link expires in 24 hours. If you did not request a reset,\n\
            you can ignore this message.\n"
        );
        self.send(to, "Reset your password", &body).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_service() {
        let service = EmailService::disabled("https://arcana.example/");
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_send_is_noop() {
        let service = EmailService::disabled("https://arcana.example");
        let result = service.send("user@example.com", "Subject", "Body").await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_disabled_config_builds_disabled_service() {
        let config = EmailConfig {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: String::new(),
        };
        let service = EmailService::new(&config, "https://arcana.example").unwrap();
        assert!(!service.is_enabled());
    }
}
