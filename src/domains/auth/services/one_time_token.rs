use chrono::{DateTime, Duration, Utc};
use crate::shared::utils::{generate_random_token, hash_token, RANDOM_TOKEN_LEN};

/// 비밀번호 재설정 토큰 수명
pub fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

/// 이메일 인증 토큰 수명
pub fn verify_token_ttl() -> Duration {
    Duration::hours(24)
}

/// 일회용 토큰 (비밀번호 재설정, 이메일 인증)
/// One-time token for password reset and email verification
///
/// 원본 값(`token`)은 메일로만 나가고, 사용자 행에는 `token_hash`만 저장됩니다.
/// 사용 성공 시 저장된 값과 만료 시간은 같은 UPDATE에서 NULL로 지워집니다.
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub token: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeToken {
    /// 새 토큰 발급: 랜덤 값 + 절대 만료 시각
    pub fn issue(ttl: Duration) -> Self {
        Self::issue_at(ttl, Utc::now())
    }

    pub fn issue_at(ttl: Duration, now: DateTime<Utc>) -> Self {
        let token = generate_random_token(RANDOM_TOKEN_LEN);
        let token_hash = hash_token(&token);

        Self {
            token,
            token_hash,
            expires_at: now + ttl,
        }
    }

    /// 저장된 토큰과 일치하고 만료 시각이 now보다 엄격히 뒤일 때만 유효
    pub fn is_valid(
        stored_hash: Option<&str>,
        stored_expires_at: Option<DateTime<Utc>>,
        supplied: &str,
        now: DateTime<Utc>,
    ) -> bool {
        match (stored_hash, stored_expires_at) {
            (Some(stored), Some(expires_at)) => stored == hash_token(supplied) && expires_at > now,
            _ => false,
        }
    }
}
