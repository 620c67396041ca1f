// =====================================================
// 통합 테스트 공통 헬퍼
// =====================================================
// 목적: 인메모리 저장소 + 기록용 메일 전송기로 AppState 구성
//
// 사용법:
// ```rust
// mod common;
// use common::*;
//
// #[tokio::test]
// async fn test_something() {
//     let app = TestApp::new();
//     // 테스트 코드...
// }
// ```
// =====================================================
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use auth_api::domains::auth::models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use auth_api::domains::auth::services::AuthService;
use auth_api::shared::clients::{EmailMessage, EmailSender};
use auth_api::shared::config::{AppConfig, JwtConfig, PasswordConfig};
use auth_api::shared::database::MemoryStore;
use auth_api::shared::services::{AppState, NotificationService};

pub const TEST_PASSWORD: &str = "password123";

/// 보낸 메일을 모아두는 전송기
#[derive(Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}

/// 항상 실패하는 전송기 (메일 장애 상황)
pub struct FailingEmailSender;

#[async_trait]
impl EmailSender for FailingEmailSender {
    async fn send(&self, _message: &EmailMessage) -> anyhow::Result<()> {
        anyhow::bail!("smtp connection refused")
    }
}

pub struct TestApp {
    pub config: AppConfig,
    pub store: MemoryStore,
    pub state: AppState,
    pub outbox: RecordingEmailSender,
}

/// 테스트용 설정: 고정 secret, 저비용 argon2
pub fn test_config() -> AppConfig {
    AppConfig {
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            ..JwtConfig::default()
        },
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..AppConfig::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let outbox = RecordingEmailSender::default();
        Self::with_sender(Arc::new(outbox.clone()), outbox)
    }

    /// 메일 발송이 전부 실패하는 환경
    pub fn with_failing_email() -> Self {
        Self::with_sender(Arc::new(FailingEmailSender), RecordingEmailSender::default())
    }

    fn with_sender(sender: Arc<dyn EmailSender>, outbox: RecordingEmailSender) -> Self {
        let config = test_config();
        let store = MemoryStore::new();
        let notifications = NotificationService::new(sender, config.email.clone());

        let state = AppState::new(
            &config,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            notifications,
        )
        .expect("Failed to build AppState");

        Self {
            config,
            store,
            state,
            outbox,
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.state.auth_state.auth_service
    }

    pub async fn register(&self, email: &str, username: &str) -> UserResponse {
        self.auth()
            .register(RegisterRequest {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                username: username.to_string(),
            })
            .await
            .expect("Failed to register")
    }

    pub async fn login(&self, email: &str, password: &str) -> LoginResponse {
        self.auth()
            .login(
                LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                None,
                None,
            )
            .await
            .expect("Failed to login")
    }

    /// `subject`로 시작하는 메일이 `to`에게 도착할 때까지 대기 (최대 2초)
    /// 같은 종류의 메일이 여러 통이면 가장 최근 것
    pub async fn wait_for_email(&self, to: &str, subject: &str) -> EmailMessage {
        self.wait_for_nth_email(to, subject, 1).await
    }

    pub async fn wait_for_nth_email(&self, to: &str, subject: &str, n: usize) -> EmailMessage {
        for _ in 0..200 {
            {
                let sent = self.outbox.sent.lock();
                let matching: Vec<&EmailMessage> = sent
                    .iter()
                    .filter(|m| m.to == to && m.subject.starts_with(subject))
                    .collect();
                if matching.len() >= n {
                    return matching[n - 1].clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no email #{} with subject {:?} for {}", n, subject, to);
    }

    pub fn sent_count(&self) -> usize {
        self.outbox.sent.lock().len()
    }
}

/// 메일 본문 링크에서 token 값 추출
pub fn token_from_email(message: &EmailMessage) -> String {
    let start = message
        .body
        .find("token=")
        .map(|i| i + "token=".len())
        .expect("email has no token link");

    message.body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}
