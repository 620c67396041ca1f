use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;
use crate::domains::auth::models::{NewUser, RefreshToken, RefreshTokenCreate, User};
use super::{RefreshTokenStore, UserStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// token_hash → row
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// 인메모리 저장소
/// In-memory store
///
/// PostgreSQL 구현과 같은 제약을 지킵니다:
/// email/username unique, token_hash unique, 사용자 삭제 없음.
/// 모든 연산은 하나의 Mutex 안에서 끝나므로 rotate/consume가 원자적입니다.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 Refresh Token 행 개수 (만료 포함)
    pub fn refresh_token_rows(&self) -> usize {
        self.tables.lock().refresh_tokens.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> Result<bool> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .any(|u| u.email == email || u.username == username))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let mut tables = self.tables.lock();

        let taken = tables
            .users
            .values()
            .any(|u| u.email == new_user.email || u.username == new_user.username);
        if taken {
            return Ok(None);
        }

        let now = Utc::now();
        let user = User {
            id: new_user.id,
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: true,
            is_verified: false,
            verify_token_hash: Some(new_user.verify_token_hash),
            verify_token_expires_at: Some(new_user.verify_token_expires_at),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(Some(user))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .find(|u| {
                u.reset_token_hash.as_deref() == Some(token_hash)
                    && u.reset_token_expires_at.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn find_by_verify_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .find(|u| {
                u.verify_token_hash.as_deref() == Some(token_hash)
                    && u.verify_token_expires_at.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn set_reset_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.lock();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.reset_token_hash = Some(token_hash.to_string());
        user.reset_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_verify_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.lock();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.verify_token_hash = Some(token_hash.to_string());
        user.verify_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn consume_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.lock();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };

        let still_valid = user.reset_token_hash.as_deref() == Some(token_hash)
            && user.reset_token_expires_at.is_some_and(|exp| exp > now);
        if !still_valid {
            return Ok(false);
        }

        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn consume_verify_token(&self, user_id: Uuid, token_hash: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.lock();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };

        let still_valid = !user.is_verified
            && user.verify_token_hash.as_deref() == Some(token_hash)
            && user.verify_token_expires_at.is_some_and(|exp| exp > now);
        if !still_valid {
            return Ok(false);
        }

        user.is_verified = true;
        user.verify_token_hash = None;
        user.verify_token_expires_at = None;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<bool> {
        let mut tables = self.tables.lock();
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.is_active = is_active;
        user.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create(&self, data: RefreshTokenCreate) -> Result<RefreshToken> {
        let mut tables = self.tables.lock();
        if tables.refresh_tokens.contains_key(&data.token_hash) {
            anyhow::bail!("Failed to create refresh token: duplicate token hash");
        }

        let row = RefreshToken {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            token_hash: data.token_hash,
            expires_at: data.expires_at,
            created_at: Utc::now(),
        };
        tables.refresh_tokens.insert(row.token_hash.clone(), row.clone());

        Ok(row)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        Ok(self.tables.lock().refresh_tokens.get(token_hash).cloned())
    }

    async fn rotate(&self, old_token_hash: &str, replacement: RefreshTokenCreate) -> Result<Option<RefreshToken>> {
        let mut tables = self.tables.lock();
        if tables.refresh_tokens.contains_key(&replacement.token_hash) {
            anyhow::bail!("Failed to insert rotated refresh token: duplicate token hash");
        }
        if tables.refresh_tokens.remove(old_token_hash).is_none() {
            return Ok(None);
        }

        let row = RefreshToken {
            id: Uuid::now_v7(),
            user_id: replacement.user_id,
            token_hash: replacement.token_hash,
            expires_at: replacement.expires_at,
            created_at: Utc::now(),
        };
        tables.refresh_tokens.insert(row.token_hash.clone(), row.clone());

        Ok(Some(row))
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool> {
        Ok(self.tables.lock().refresh_tokens.remove(token_hash).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let mut tables = self.tables.lock();
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|_, row| row.user_id != user_id);
        Ok((before - tables.refresh_tokens.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.lock();
        let before = tables.refresh_tokens.len();
        tables.refresh_tokens.retain(|_, row| !row.is_expired_at(now));
        Ok((before - tables.refresh_tokens.len()) as u64)
    }
}
