use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domains::auth::models::user::{Role, User};

/// 토큰에 담기는 사용자 식별 정보
/// Identity carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// JWT Claims (토큰에 포함될 데이터)
/// JWT Claims (data to be included in token)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    /// User ID
    pub user_id: Uuid,

    /// 이메일
    /// Email
    pub email: String,

    /// 권한
    /// Role
    pub role: Role,

    /// 만료 시간 (Unix timestamp)
    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// 발급 시간 (Unix timestamp)
    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// 토큰 고유 ID: 같은 초에 발급된 토큰도 서로 다르게 만듦
    /// Token ID, keeps tokens minted in the same second distinct
    pub jti: Uuid,
}

impl Claims {
    /// 새 Claims 생성 (만료 시간 자동 계산)
    /// Create new Claims (expiration time automatically calculated)
    pub fn new(subject: &TokenSubject, ttl_seconds: u64) -> Self {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX / 2);

        Self {
            user_id: subject.user_id,
            email: subject.email.clone(),
            role: subject.role,
            exp: now.saturating_add(ttl),
            iat: now,
            jti: Uuid::new_v4(),
        }
    }

    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}
