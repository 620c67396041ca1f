use std::sync::Arc;
use chrono::{Duration, Utc};
use uuid::Uuid;
use crate::domains::auth::models::{RefreshTokenCreate, TokenSubject, User};
use crate::domains::auth::services::JwtService;
use crate::shared::database::{RefreshTokenStore, UserStore};
use crate::shared::errors::AuthError;
use crate::shared::utils::hash_token;

/// Redeem에 성공한 세션
/// A ledger row that passed every validity check
#[derive(Debug, Clone)]
pub struct RedeemedSession {
    pub user: User,
    token_hash: String,
}

/// Refresh Token Ledger
///
/// 발급된 Refresh Token 한 개당 한 행. 행이 있고, 만료되지 않았고,
/// 소유자가 활성 상태일 때만 유효합니다. 행을 지우면 토큰 자체의 exp와 상관없이 즉시 무효.
#[derive(Clone)]
pub struct RefreshTokenLedger {
    tokens: Arc<dyn RefreshTokenStore>,
    users: Arc<dyn UserStore>,
    jwt_service: JwtService,
    ttl_seconds: u64,
}

impl RefreshTokenLedger {
    pub fn new(
        tokens: Arc<dyn RefreshTokenStore>,
        users: Arc<dyn UserStore>,
        jwt_service: JwtService,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            tokens,
            users,
            jwt_service,
            ttl_seconds,
        }
    }

    /// 새 Refresh Token 발급 + 저장
    /// Issue and persist a refresh token, returning the raw token
    pub async fn issue(&self, subject: &TokenSubject) -> Result<String, AuthError> {
        let (token, create) = self.mint(subject)?;

        self.tokens
            .create(create)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to create refresh token: {}", e)))?;

        Ok(token)
    }

    /// 저장된 행 확인 (삭제하지 않음)
    /// Check the ledger row without deleting it
    pub async fn redeem(&self, token: &str) -> Result<RedeemedSession, AuthError> {
        let token_hash = hash_token(token);

        let stored = self
            .tokens
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to find refresh token: {}", e)))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if stored.is_expired_at(Utc::now()) {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .users
            .get_user_by_id(stored.user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if !user.is_active {
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(RedeemedSession { user, token_hash })
    }

    /// Rotation: 이전 행 삭제 + 새 행 저장 (한 트랜잭션)
    /// 같은 토큰으로 동시에 들어온 요청 중 하나만 성공합니다.
    pub async fn rotate(&self, session: &RedeemedSession) -> Result<String, AuthError> {
        let (token, create) = self.mint(&TokenSubject::from(&session.user))?;

        let rotated = self
            .tokens
            .rotate(&session.token_hash, create)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to rotate refresh token: {}", e)))?;

        match rotated {
            Some(_) => Ok(token),
            None => Err(AuthError::InvalidRefreshToken),
        }
    }

    /// 행 삭제. 삭제된 행이 있었는지 반환
    pub async fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        self.tokens
            .delete_by_token_hash(&hash_token(token))
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to revoke refresh token: {}", e)))
    }

    /// 사용자의 모든 세션 삭제
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        self.tokens
            .delete_all_for_user(user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to revoke all refresh tokens: {}", e)))
    }

    /// 만료된 행 정리
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        self.tokens
            .delete_expired(Utc::now())
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to purge refresh tokens: {}", e)))
    }

    // 저장 만료 시각은 토큰의 exp와 별개로 계산 (Ledger 쪽이 기준)
    fn mint(&self, subject: &TokenSubject) -> Result<(String, RefreshTokenCreate), AuthError> {
        let expires_at = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Internal(format!("Refresh token TTL out of range: {}s", self.ttl_seconds))
            })?;
        let token = self.jwt_service.sign(subject, self.ttl_seconds)?;

        let create = RefreshTokenCreate {
            user_id: subject.user_id,
            token_hash: hash_token(&token),
            expires_at,
        };

        Ok((token, create))
    }
}
