// Auth repositories
//
// Service 계층은 UserStore / RefreshTokenStore trait만 참조합니다.
// - UserRepository, RefreshTokenRepository: PostgreSQL 구현 (sqlx)
// - MemoryStore: 인메모리 구현 (테스트, DATABASE_URL 없이 실행)
pub mod user_repository;
pub mod refresh_token_repository;
pub mod memory_store;

pub use user_repository::*;
pub use refresh_token_repository::*;
pub use memory_store::*;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domains::auth::models::{NewUser, RefreshToken, RefreshTokenCreate, User};

/// 사용자 저장소 인터페이스
/// Credential store interface
///
/// 토큰 관련 메서드는 모두 원본 토큰이 아닌 SHA-256 digest를 받습니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일 또는 사용자명 중 하나라도 이미 사용 중인지 확인
    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> Result<bool>;

    /// 사용자 생성. 이메일/사용자명 unique 제약에 걸리면 `None`
    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// 만료되지 않은 재설정 토큰을 가진 사용자 조회
    async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>>;

    /// 만료되지 않은 인증 토큰을 가진 사용자 조회
    async fn find_by_verify_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>>;

    /// 재설정 토큰 덮어쓰기 (마지막 요청이 이김)
    async fn set_reset_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<bool>;

    /// 인증 토큰 덮어쓰기
    async fn set_verify_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<bool>;

    /// 재설정 토큰이 아직 같고 유효할 때만 비밀번호 변경 + 토큰 삭제
    /// Returns false when the token was consumed or replaced in the meantime
    async fn consume_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// 인증 토큰이 아직 같고 유효할 때만 is_verified = true + 토큰 삭제
    async fn consume_verify_token(&self, user_id: Uuid, token_hash: &str, now: DateTime<Utc>) -> Result<bool>;

    /// 계정 활성/비활성 (관리자 작업)
    async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<bool>;
}

/// Refresh Token 저장소 인터페이스 (Ledger의 영속 계층)
/// Refresh token store interface
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(&self, data: RefreshTokenCreate) -> Result<RefreshToken>;

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>>;

    /// 이전 토큰 삭제 + 새 토큰 저장을 하나의 트랜잭션으로 처리
    /// Delete the old row and insert the replacement atomically.
    /// Returns `None` (and inserts nothing) when the old row no longer exists.
    async fn rotate(&self, old_token_hash: &str, replacement: RefreshTokenCreate) -> Result<Option<RefreshToken>>;

    /// 삭제된 행이 있었는지 반환
    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool>;

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64>;

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
