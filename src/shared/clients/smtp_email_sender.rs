use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use crate::shared::clients::{EmailMessage, EmailSender};
use crate::shared::config::SmtpConfig;

/// SMTP 전송기
/// SMTP transport backed by lettre's tokio executor
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    /// 연결은 첫 발송 때 열림 (생성만으로는 네트워크 I/O 없음)
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .with_context(|| format!("Failed to configure SMTP relay {}", config.host))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();

        Ok(Self { transport })
    }

    /// SMTP 서버 접속 확인
    /// Check that the relay accepts a connection
    pub async fn test_connection(&self) -> Result<bool> {
        self.transport
            .test_connection()
            .await
            .context("SMTP connection check failed")
    }
}

fn build_message(message: &EmailMessage) -> Result<Message> {
    let from: Mailbox = message
        .from
        .parse()
        .with_context(|| format!("Invalid sender address: {}", message.from))?;
    let to: Mailbox = message
        .to
        .parse()
        .with_context(|| format!("Invalid recipient address: {}", message.to))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .context("Failed to build email")
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = build_message(message)?;

        let response = self
            .transport
            .send(email)
            .await
            .with_context(|| format!("SMTP delivery to {} failed", message.to))?;

        tracing::info!(to = %message.to, code = %response.code(), "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "Auth API <noreply@example.com>".to_string(),
            to: to.to_string(),
            subject: "Reset Your Password".to_string(),
            body: "Reset link: http://localhost:3000/reset-password?token=abc".to_string(),
        }
    }

    #[test]
    fn builds_plain_text_message_with_named_sender() {
        let email = build_message(&message("alice@example.com")).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();

        assert!(raw.contains("Auth API"));
        assert!(raw.contains("<noreply@example.com>"));
        assert!(raw.contains("alice@example.com"));
        assert!(raw.contains("Subject: Reset Your Password"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn invalid_recipient_is_an_error() {
        assert!(build_message(&message("not an address")).is_err());
    }

    #[tokio::test]
    async fn relay_is_configured_without_connecting() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: "mailer".to_string(),
            password: "secret".to_string(),
        };

        assert!(SmtpEmailSender::new(&config).is_ok());
    }
}
