use anyhow::Result;
use async_trait::async_trait;

/// 발송할 메일 한 통
/// Outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// `"Name <address>"` 형식
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// 메일 전송 인터페이스
/// Email transport
///
/// SMTP 설정이 있으면 `SmtpEmailSender`, 없으면 `LogEmailSender`.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// 로그로만 남기는 전송기 (SMTP 미설정 시)
/// Fallback transport that only logs the message
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "email delivery not configured, logging message only"
        );
        tracing::debug!(body = %message.body, "email body");
        Ok(())
    }
}
