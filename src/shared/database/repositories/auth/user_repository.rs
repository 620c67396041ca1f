use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domains::auth::models::user::{NewUser, Role, User};
use super::UserStore;

const USER_COLUMNS: &str = r#"
    id, email, username, password_hash, role, is_active, is_verified,
    verify_token_hash, verify_token_expires_at,
    reset_token_hash, reset_token_expires_at,
    created_at, updated_at
"#;

// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, condition: &str, bind: &str, now: Option<DateTime<Utc>>) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, condition);
        let mut query = sqlx::query(&sql).bind(bind);
        if let Some(now) = now {
            query = query.bind(now);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let role: String = row.get("role");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role: role.parse::<Role>().map_err(|e| anyhow!(e))?,
        is_active: row.get("is_active"),
        is_verified: row.get("is_verified"),
        verify_token_hash: row.get("verify_token_hash"),
        verify_token_expires_at: row.get("verify_token_expires_at"),
        reset_token_hash: row.get("reset_token_hash"),
        reset_token_expires_at: row.get("reset_token_expires_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl UserStore for UserRepository {
    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users WHERE email = $1 OR username = $2
            )
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check user existence")?;

        Ok(exists)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<Option<User>> {
        let sql = format!(
            r#"
            INSERT INTO users (
                id, email, username, password_hash, role, is_active, is_verified,
                verify_token_hash, verify_token_expires_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, TRUE, FALSE, $6, $7, NOW(), NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let result = sqlx::query(&sql)
            .bind(new_user.id)
            .bind(&new_user.email)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(new_user.role.as_str())
            .bind(&new_user.verify_token_hash)
            .bind(new_user.verify_token_expires_at)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(Some(user_from_row(&row)?)),
            // 동시 회원가입: 존재 확인 이후 다른 요청이 먼저 INSERT한 경우
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to create user")),
        }
    }

    // 이메일로 사용자 조회 (로그인용)
    // Get user by email (for login)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_where("email = $1", email, None).await
    }

    // ID로 사용자 조회
    // Get user by ID
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by id")?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        self.fetch_one_where(
            "reset_token_hash = $1 AND reset_token_expires_at > $2",
            token_hash,
            Some(now),
        )
        .await
    }

    async fn find_by_verify_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        self.fetch_one_where(
            "verify_token_hash = $1 AND verify_token_expires_at > $2",
            token_hash,
            Some(now),
        )
        .await
    }

    async fn set_reset_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to store reset token")?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_verify_token(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verify_token_hash = $2, verify_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to store verification token")?;

        Ok(result.rows_affected() == 1)
    }

    async fn consume_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $3,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND reset_token_hash = $2 AND reset_token_expires_at > $4
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to reset password")?;

        Ok(result.rows_affected() == 1)
    }

    async fn consume_verify_token(&self, user_id: Uuid, token_hash: &str, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE,
                verify_token_hash = NULL,
                verify_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
              AND verify_token_hash = $2
              AND verify_token_expires_at > $3
              AND is_verified = FALSE
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to verify email")?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .execute(&self.pool)
        .await
        .context("Failed to update user activation")?;

        Ok(result.rows_affected() == 1)
    }
}
