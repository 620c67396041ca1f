use std::sync::Arc;
use crate::shared::config::AppConfig;
use crate::shared::database::{RefreshTokenStore, UserStore};
use crate::shared::errors::AuthError;
use crate::shared::services::NotificationService;
use crate::domains::auth::services::state::AuthState;
use crate::domains::auth::services::cleanup_scheduler::LedgerCleanupScheduler;

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
#[derive(Clone)]
pub struct AppState {
    pub auth_state: AuthState,
    /// 만료된 Refresh Token 정리 스케줄러
    /// Ledger cleanup scheduler
    pub ledger_cleanup_scheduler: LedgerCleanupScheduler,
    /// X-Forwarded-For를 클라이언트 IP로 사용할지 여부
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// 저장소 구현(PostgreSQL 또는 인메모리)을 받아 모든 도메인 State 조합
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        notifications: NotificationService,
    ) -> Result<Self, AuthError> {
        let auth_state = AuthState::new(config, users, tokens, notifications)?;

        let ledger_cleanup_scheduler = LedgerCleanupScheduler::new(
            auth_state.auth_service.ledger().clone(),
            config.ledger_cleanup_interval_secs,
        );

        Ok(Self {
            auth_state,
            ledger_cleanup_scheduler,
            trust_proxy_headers: config.trust_proxy_headers,
        })
    }
}
