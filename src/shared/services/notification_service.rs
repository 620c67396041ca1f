use std::sync::Arc;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use crate::shared::clients::{EmailMessage, EmailSender};
use crate::shared::config::EmailConfig;

/// 실패한 메일 발송 기록
/// A notification that could not be delivered
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub kind: &'static str,
    pub to: String,
    pub error: String,
}

/// 알림 서비스
/// Notification Sink
///
/// 모든 메일은 별도 tokio task에서 발송되고, 호출한 요청은 결과를 기다리지 않습니다.
/// 실패는 에러 채널로만 보고되며 호출자에게 전파되지 않습니다.
#[derive(Clone)]
pub struct NotificationService {
    sender: Arc<dyn EmailSender>,
    config: EmailConfig,
    failures: Option<mpsc::UnboundedSender<DeliveryFailure>>,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn EmailSender>, config: EmailConfig) -> Self {
        Self {
            sender,
            config,
            failures: None,
        }
    }

    /// 실패 보고 채널 연결
    /// Attach an error channel and return its receiving end
    pub fn with_failure_channel(mut self) -> (Self, mpsc::UnboundedReceiver<DeliveryFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.failures = Some(tx);
        (self, rx)
    }

    /// 환영 메일
    pub fn send_welcome_email(&self, email: &str, username: &str) -> JoinHandle<()> {
        let app = &self.config.from_name;
        let body = format!(
            "Hi {username},\n\n\
             Welcome to {app}! Your account has been successfully created.\n\n\
             If you have any questions, feel free to reach out to our support team.\n\n\
             Best regards,\nThe {app} Team"
        );

        self.dispatch("welcome", email, format!("Welcome to {app}"), body)
    }

    /// 이메일 인증 메일 (24시간 유효 링크)
    pub fn send_email_verification_email(&self, email: &str, username: &str, token: &str) -> JoinHandle<()> {
        let link = self.link("verify-email", token);
        let body = format!(
            "Hi {username},\n\n\
             Please verify your email address by opening the link below:\n\n\
             {link}\n\n\
             This link will expire in 24 hours.\n\n\
             Best regards,\nThe {} Team",
            self.config.from_name
        );

        self.dispatch("email_verification", email, "Verify Your Email Address".to_string(), body)
    }

    /// 비밀번호 재설정 메일 (1시간 유효 링크)
    pub fn send_password_reset_email(&self, email: &str, username: &str, token: &str) -> JoinHandle<()> {
        let link = self.link("reset-password", token);
        let body = format!(
            "Hi {username},\n\n\
             We received a request to reset your password. \
             If you didn't make this request, you can safely ignore this email.\n\n\
             {link}\n\n\
             This link will expire in 1 hour.\n\n\
             Best regards,\nThe {} Team",
            self.config.from_name
        );

        self.dispatch("password_reset", email, "Reset Your Password".to_string(), body)
    }

    /// 새 로그인 알림
    pub fn send_login_alert_email(
        &self,
        email: &str,
        username: &str,
        ip: &str,
        user_agent: Option<&str>,
    ) -> JoinHandle<()> {
        let device = user_agent
            .map(|ua| format!("Device: {ua}\n"))
            .unwrap_or_default();
        let body = format!(
            "Hi {username},\n\n\
             We detected a new login to your account.\n\n\
             Time: {}\n\
             IP Address: {ip}\n\
             {device}\n\
             If this was you, you can safely ignore this email. \
             If you don't recognize this activity, please reset your password immediately.\n\n\
             Best regards,\nThe {} Team",
            Utc::now().to_rfc2822(),
            self.config.from_name
        );

        self.dispatch("login_alert", email, "New Login Detected".to_string(), body)
    }

    // {frontend}/{path}?token={token}
    fn link(&self, path: &str, token: &str) -> String {
        let mut url = self.config.frontend_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut().append_pair("token", token);
        url.into()
    }

    fn dispatch(&self, kind: &'static str, to: &str, subject: String, body: String) -> JoinHandle<()> {
        let message = EmailMessage {
            from: format!("{} <{}>", self.config.from_name, self.config.from),
            to: to.to_string(),
            subject,
            body,
        };
        let sender = self.sender.clone();
        let failures = self.failures.clone();

        tokio::spawn(async move {
            match sender.send(&message).await {
                Ok(()) => tracing::debug!(kind, to = %message.to, "notification sent"),
                Err(e) => {
                    let failure = DeliveryFailure {
                        kind,
                        to: message.to,
                        error: e.to_string(),
                    };
                    match failures {
                        Some(tx) => {
                            // 수신 측이 닫혔으면 버림
                            let _ = tx.send(failure);
                        }
                        None => tracing::warn!(
                            kind = failure.kind,
                            to = %failure.to,
                            error = %failure.error,
                            "failed to send notification"
                        ),
                    }
                }
            }
        })
    }
}

/// 실패 채널을 읽어 로그로 남기는 백그라운드 task
/// Drain the error channel into the log
pub fn spawn_failure_logger(mut failures: mpsc::UnboundedReceiver<DeliveryFailure>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            tracing::error!(
                kind = failure.kind,
                to = %failure.to,
                error = %failure.error,
                "failed to send notification"
            );
        }
    })
}
