use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domains::auth::models::refresh_token::{RefreshToken, RefreshTokenCreate};
use super::RefreshTokenStore;

/// Refresh Token Repository
/// Refresh Token 데이터베이스 작업 처리
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn refresh_token_from_row(row: &PgRow) -> RefreshToken {
    RefreshToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
        token_hash: row.get("token_hash"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    /// Refresh Token 생성 (저장)
    /// Create and store refresh token
    async fn create(&self, data: RefreshTokenCreate) -> Result<RefreshToken> {
        let row = sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, token_hash, expires_at, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.user_id)
        .bind(&data.token_hash)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create refresh token")?;

        Ok(refresh_token_from_row(&row))
    }

    /// Refresh Token 조회 (token_hash로)
    /// Find refresh token by token hash
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, token_hash, expires_at, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find refresh token")?;

        Ok(row.as_ref().map(refresh_token_from_row))
    }

    /// Refresh Token 교체 (Rotation)
    /// 이전 토큰 삭제와 새 토큰 저장을 한 트랜잭션으로 묶어서,
    /// 중간에 실패해도 한 세션에 살아있는 토큰이 두 개가 되지 않도록 함
    async fn rotate(&self, old_token_hash: &str, replacement: RefreshTokenCreate) -> Result<Option<RefreshToken>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start rotation transaction")?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE token_hash = $1
            "#,
        )
        .bind(old_token_hash)
        .execute(&mut *tx)
        .await
        .context("Failed to delete old refresh token")?;

        // 다른 요청이 먼저 교체함 → 새 토큰 발급하지 않음
        if deleted.rows_affected() == 0 {
            tx.rollback()
                .await
                .context("Failed to roll back rotation")?;
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, token_hash, expires_at, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(replacement.user_id)
        .bind(&replacement.token_hash)
        .bind(replacement.expires_at)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert rotated refresh token")?;

        tx.commit()
            .await
            .context("Failed to commit rotation")?;

        Ok(Some(refresh_token_from_row(&row)))
    }

    /// Refresh Token 삭제 (로그아웃)
    /// Delete refresh token
    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .context("Failed to delete refresh token")?;

        Ok(result.rows_affected() > 0)
    }

    /// 사용자의 모든 Refresh Token 삭제 (모든 기기에서 로그아웃)
    /// Delete all refresh tokens for a user
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to delete all refresh tokens for user")?;

        Ok(result.rows_affected())
    }

    /// 만료된 토큰 삭제 (정리 작업)
    /// Delete expired tokens (cleanup)
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to delete expired refresh tokens")?;

        Ok(result.rows_affected())
    }
}
