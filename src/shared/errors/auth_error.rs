use thiserror::Error;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use uuid::Uuid;

/// 토큰 서명/검증 에러
/// Token signing/verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// 서명이 맞지 않음 (다른 키로 서명되었거나 변조됨)
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// 만료된 토큰
    #[error("Token has expired")]
    Expired,

    /// 형식이 잘못된 토큰
    #[error("Token is malformed: {0}")]
    Malformed(String),
}

/// 인증 관련 에러
/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// 이메일 또는 사용자명이 이미 존재함 (어느 쪽인지 밝히지 않음)
    /// Email or username already exists
    #[error("User with this email or username already exists")]
    UserAlreadyExists,

    /// 잘못된 이메일 또는 비밀번호 (존재하지 않는 계정, 비활성 계정 포함)
    /// Invalid email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 잘못된, 만료된 또는 이미 사용된 Refresh Token
    /// Invalid, expired or already redeemed refresh token
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// 잘못된 또는 만료된 Access Token
    /// Invalid or expired access token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 토큰이 제공되지 않음
    /// Token not provided
    #[error("Token not provided")]
    MissingToken,

    /// 잘못된 또는 만료된 비밀번호 재설정 토큰
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    /// 잘못된 또는 만료된 이메일 인증 토큰
    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,

    /// 이미 인증된 이메일
    #[error("Email is already verified")]
    AlreadyVerified,

    /// 요청 검증 실패
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// 사용자를 찾을 수 없음
    /// User not found
    #[error("User not found: id={id}")]
    UserNotFound { id: Uuid },

    /// 비밀번호 해싱 실패
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    PasswordHashingFailed(String),

    /// 비밀번호 검증 실패 (저장된 해시가 손상됨)
    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    PasswordVerificationFailed(String),

    /// 데이터베이스 에러
    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 내부 서버 에러
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::UserAlreadyExists => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidToken
            | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidResetToken
            | AuthError::InvalidVerificationToken
            | AuthError::AlreadyVerified
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound { .. } => StatusCode::NOT_FOUND,
            AuthError::PasswordHashingFailed(_)
            | AuthError::PasswordVerificationFailed(_)
            | AuthError::DatabaseError(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트용 고정 에러 코드
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            _ => "INTERNAL",
        }
    }

    /// 클라이언트에 노출할 메시지 (내부 에러 상세는 숨김)
    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// AuthError를 HTTP 응답으로 변환
impl From<AuthError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: AuthError) -> Self {
        let status = err.status();

        if status.is_server_error() {
            tracing::error!(error = %err, "request failed with internal error");
        } else {
            tracing::debug!(error = %err, code = err.code(), "request rejected");
        }

        (
            status,
            Json(json!({
                "success": false,
                "message": err.public_message(),
                "error": { "code": err.code() },
            })),
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body): (StatusCode, Json<serde_json::Value>) = self.into();
        (status, body).into_response()
    }
}
