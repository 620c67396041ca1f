// Auth domain state
// 인증 도메인 상태
use std::sync::Arc;
use crate::shared::config::AppConfig;
use crate::shared::database::{RefreshTokenStore, UserStore};
use crate::shared::errors::AuthError;
use crate::shared::services::NotificationService;
use crate::domains::auth::services::{AuthService, JwtService, PasswordService, RefreshTokenLedger};

/// Auth domain state
/// 인증 도메인에서 필요한 서비스들을 포함하는 상태
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: AuthService,
    /// 인증 미들웨어의 Access Token 검증용
    pub jwt_service: JwtService,
}

impl AuthState {
    /// 저장소와 알림 서비스를 받아 인증 서비스 조립
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        notifications: NotificationService,
    ) -> Result<Self, AuthError> {
        let jwt_service = JwtService::new(&config.jwt.secret);
        let password_service = PasswordService::new(&config.password)?;
        let ledger = RefreshTokenLedger::new(
            tokens,
            users.clone(),
            jwt_service.clone(),
            config.jwt.refresh_ttl_secs,
        );

        Ok(Self {
            auth_service: AuthService::new(
                users,
                ledger,
                jwt_service.clone(),
                password_service,
                notifications,
                config.jwt.access_ttl_secs,
            ),
            jwt_service,
        })
    }
}
