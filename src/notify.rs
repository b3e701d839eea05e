//! Trade notifications
//!
//! Fire-and-log: callers log a failed notification and carry on.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::NotifyConfig;

/// Notification delivery port
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

/// Writes notifications to the log only
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        info!(subject, body, "Notification");
        Ok(())
    }
}

/// Plain-text e-mail over implicit-TLS SMTP
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    smtp_server: String,
    port: u16,
    from: Mailbox,
    to: Mailbox,
    username: String,
    password: String,
}

impl EmailNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let password = config
            .password
            .clone()
            .context("SMTP password missing (set notify.password or SMTP_PASSWORD)")?;

        let from = Mailbox::new(
            Some(config.sender_name.clone()),
            config
                .sender
                .parse()
                .map_err(|e| anyhow!("Invalid sender address '{}': {}", config.sender, e))?,
        );
        let to = Mailbox::new(
            Some(config.receiver_name.clone()),
            config
                .receiver
                .parse()
                .map_err(|e| anyhow!("Invalid receiver address '{}': {}", config.receiver, e))?,
        );

        Ok(EmailNotifier {
            smtp_server: config.smtp_server.clone(),
            port: config.port,
            from,
            to,
            username: config.sender.clone(),
            password,
        })
    }

    /// Build the message without sending it
    pub fn build_message(&self, subject: &str, body: &str) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build e-mail")
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(subject, body)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_server)
            .with_context(|| format!("Failed to set up SMTP relay {}", self.smtp_server))?
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();

        mailer
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        info!("Email sent: {}", subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notify_config() -> NotifyConfig {
        NotifyConfig {
            smtp_server: "smtp.example.com".to_string(),
            port: 465,
            sender: "bot@example.com".to_string(),
            password: Some("secret".to_string()),
            receiver: "trader@example.com".to_string(),
            sender_name: "Trading Bot".to_string(),
            receiver_name: "Trader".to_string(),
        }
    }

    #[test]
    fn test_email_notifier_builds_message() {
        let notifier = EmailNotifier::new(&notify_config()).unwrap();
        let message = notifier.build_message("Order executed", "BUY 0.001 BTCUSDT").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Order executed"));
        assert!(raw.contains("bot@example.com"));
        assert!(raw.contains("trader@example.com"));
    }

    #[test]
    fn test_email_notifier_requires_password() {
        let mut config = notify_config();
        config.password = None;
        assert!(EmailNotifier::new(&config).is_err());
    }

    #[test]
    fn test_email_notifier_rejects_bad_address() {
        let mut config = notify_config();
        config.receiver = "not an address".to_string();
        assert!(EmailNotifier::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send("subject", "body").await.is_ok());
    }
}
