use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use crate::domains::auth::models::user::UserResponse;

// 회원가입 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = RegisterRequest)]
pub struct RegisterRequest {
    /// Email address
    /// 이메일 주소
    #[schema(example = "user@example.com")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be hashed)
    /// 비밀번호 (해싱됨)
    #[schema(example = "password123")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Username
    /// 사용자명
    #[schema(example = "johndoe")]
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
}

// 로그인 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = LoginRequest)]
pub struct LoginRequest {
    /// Email address
    /// 이메일 주소
    #[schema(example = "user@example.com")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    /// 비밀번호
    #[schema(example = "password123")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// 로그인 응답 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = LoginResponse)]
pub struct LoginResponse {
    /// User information (without password)
    /// 사용자 정보 (비밀번호 제외)
    pub user: UserResponse,

    /// JWT Access Token (짧은 수명)
    /// JWT Access Token (short lifetime)
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,

    /// Refresh Token (긴 수명, DB에 저장)
    /// Refresh Token (long lifetime, stored in database)
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh_token: String,
}

// 토큰 갱신 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[schema(as = RefreshTokenRequest)]
pub struct RefreshTokenRequest {
    /// Refresh Token
    /// 리프레시 토큰
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// 토큰 갱신 응답 모델
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = TokenPairResponse)]
pub struct TokenPairResponse {
    /// 새 Access Token
    /// New Access Token
    pub access_token: String,

    /// 새 Refresh Token (이전 토큰은 즉시 무효)
    /// New Refresh Token (the previous one is dead immediately)
    pub refresh_token: String,
}

// 로그아웃 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[schema(as = LogoutRequest)]
pub struct LogoutRequest {
    /// Refresh Token
    /// 리프레시 토큰
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

// 비밀번호 재설정 요청 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = RequestPasswordResetRequest)]
pub struct RequestPasswordResetRequest {
    #[schema(example = "user@example.com")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

// 비밀번호 재설정 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = ResetPasswordRequest)]
pub struct ResetPasswordRequest {
    /// 이메일로 받은 재설정 토큰
    /// Reset token received by email
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,

    /// 새 비밀번호
    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

// 이메일 인증 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = VerifyEmailRequest)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Verification token is required"))]
    pub token: String,
}

// 인증 메일 재전송 모델
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[schema(as = ResendVerificationRequest)]
pub struct ResendVerificationRequest {
    #[schema(example = "user@example.com")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}
