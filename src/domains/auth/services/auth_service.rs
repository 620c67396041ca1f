use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;
use crate::shared::database::UserStore;
use crate::shared::errors::AuthError;
use crate::shared::services::NotificationService;
use crate::shared::utils::hash_token;
use crate::domains::auth::models::{
    LoginRequest, LoginResponse, NewUser, RegisterRequest, Role, TokenPairResponse, TokenSubject,
    User, UserResponse,
};
use crate::domains::auth::services::{
    reset_token_ttl, verify_token_ttl, JwtService, OneTimeToken, PasswordService, RefreshTokenLedger,
};

pub const PASSWORD_RESET_REQUESTED_MESSAGE: &str =
    "If an account with this email exists, a password reset email has been sent.";
pub const VERIFICATION_RESENT_MESSAGE: &str =
    "If an account with this email exists, a verification email has been sent.";
pub const ALREADY_VERIFIED_MESSAGE: &str = "Email is already verified";

// 인증 서비스
// AuthService: handles authentication business logic
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    ledger: RefreshTokenLedger,
    jwt_service: JwtService,
    password_service: PasswordService,
    notifications: NotificationService,
    access_ttl_secs: u64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        ledger: RefreshTokenLedger,
        jwt_service: JwtService,
        password_service: PasswordService,
        notifications: NotificationService,
        access_ttl_secs: u64,
    ) -> Self {
        Self {
            users,
            ledger,
            jwt_service,
            password_service,
            notifications,
            access_ttl_secs,
        }
    }

    pub fn ledger(&self) -> &RefreshTokenLedger {
        &self.ledger
    }

    // 회원가입
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        // 1. 이메일/사용자명 중복 확인 (어느 쪽인지 밝히지 않음)
        let taken = self
            .users
            .exists_by_email_or_username(&request.email, &request.username)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to check user existence: {}", e)))?;

        if taken {
            return Err(AuthError::UserAlreadyExists);
        }

        // 2. 비밀번호 해싱
        let password_hash = self.password_service.hash_password(&request.password)?;

        // 3. 이메일 인증 토큰 (24시간)
        let verification = OneTimeToken::issue(verify_token_ttl());

        // 4. 사용자 생성 (동시 가입으로 unique 제약에 걸리면 None)
        let user = self
            .users
            .create_user(NewUser {
                id: Uuid::now_v7(),
                email: request.email,
                username: request.username,
                password_hash,
                role: Role::User,
                verify_token_hash: verification.token_hash,
                verify_token_expires_at: verification.expires_at,
            })
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to create user: {}", e)))?
            .ok_or(AuthError::UserAlreadyExists)?;

        // 5. 메일 발송 (기다리지 않음)
        self.notifications
            .send_email_verification_email(&user.email, &user.username, &verification.token);
        self.notifications.send_welcome_email(&user.email, &user.username);

        tracing::info!(user_id = %user.id, "user registered");

        Ok(user.into())
    }

    // 로그인
    // 존재하지 않는 계정, 비활성 계정, 비밀번호 불일치 모두 같은 InvalidCredentials
    pub async fn login(
        &self,
        request: LoginRequest,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .get_user_by_email(&request.email)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        self.password_service
            .verify_password(&request.password, &user.password_hash)?;

        // 기존 세션은 유지 (기기마다 독립된 Refresh Token)
        let subject = TokenSubject::from(&user);
        let access_token = self.jwt_service.sign(&subject, self.access_ttl_secs)?;
        let refresh_token = self.ledger.issue(&subject).await?;

        self.notifications.send_login_alert_email(
            &user.email,
            &user.username,
            ip.as_deref().unwrap_or("unknown"),
            user_agent.as_deref(),
        );

        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }

    /// Refresh Token으로 새 토큰 쌍 발급 (Rotation)
    /// Verify refresh token, rotate it and issue a new access token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPairResponse, AuthError> {
        // 1. 서명/만료 사전 검사
        self.jwt_service
            .verify(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        // 2. Ledger 행 확인 (존재 + 만료 + 사용자 활성)
        let session = self.ledger.redeem(refresh_token).await?;

        // 3. 이전 행 삭제 + 새 행 저장
        let new_refresh_token = self.ledger.rotate(&session).await?;
        let access_token = self
            .jwt_service
            .sign(&TokenSubject::from(&session.user), self.access_ttl_secs)?;

        Ok(TokenPairResponse {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    /// 로그아웃 - 없는 토큰이어도 성공
    /// Logout - Revoke refresh token (idempotent)
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let revoked = self.ledger.revoke(refresh_token).await?;
        if !revoked {
            tracing::debug!("logout with unknown refresh token");
        }

        Ok(())
    }

    /// 모든 기기에서 로그아웃
    /// Revoke all refresh tokens for user
    pub async fn logout_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let revoked = self.ledger.revoke_all(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "logged out from all devices");

        Ok(revoked)
    }

    /// 비밀번호 재설정 요청 (계정 존재 여부와 상관없이 같은 메시지)
    pub async fn request_password_reset(&self, email: &str) -> Result<&'static str, AuthError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(PASSWORD_RESET_REQUESTED_MESSAGE);
        };

        // 마지막 요청이 이김 (이전 링크는 무효)
        let reset = OneTimeToken::issue(reset_token_ttl());
        self.users
            .set_reset_token(user.id, &reset.token_hash, reset.expires_at)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to store reset token: {}", e)))?;

        self.notifications
            .send_password_reset_email(&user.email, &user.username, &reset.token);

        Ok(PASSWORD_RESET_REQUESTED_MESSAGE)
    }

    /// 비밀번호 재설정
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let now = Utc::now();
        let token_hash = hash_token(token);

        let user = self
            .users
            .find_by_reset_token(&token_hash, now)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to find reset token: {}", e)))?
            .filter(|u| {
                OneTimeToken::is_valid(u.reset_token_hash.as_deref(), u.reset_token_expires_at, token, now)
            })
            .ok_or(AuthError::InvalidResetToken)?;

        let password_hash = self.password_service.hash_password(new_password)?;

        // 같은 토큰으로 동시에 들어온 요청은 하나만 성공
        let consumed = self
            .users
            .consume_reset_token(user.id, &token_hash, &password_hash, now)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to reset password: {}", e)))?;

        if !consumed {
            return Err(AuthError::InvalidResetToken);
        }

        tracing::info!(user_id = %user.id, "password reset");

        Ok(())
    }

    /// 이메일 인증
    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let now = Utc::now();
        let token_hash = hash_token(token);

        let user = self
            .users
            .find_by_verify_token(&token_hash, now)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to find verification token: {}", e)))?
            .filter(|u| {
                OneTimeToken::is_valid(u.verify_token_hash.as_deref(), u.verify_token_expires_at, token, now)
            })
            .ok_or(AuthError::InvalidVerificationToken)?;

        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let consumed = self
            .users
            .consume_verify_token(user.id, &token_hash, now)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to verify email: {}", e)))?;

        if !consumed {
            return Err(AuthError::InvalidVerificationToken);
        }

        tracing::info!(user_id = %user.id, "email verified");

        Ok(())
    }

    /// 인증 메일 재전송
    pub async fn resend_verification_email(&self, email: &str) -> Result<&'static str, AuthError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(VERIFICATION_RESENT_MESSAGE);
        };

        if user.is_verified {
            return Ok(ALREADY_VERIFIED_MESSAGE);
        }

        let verification = OneTimeToken::issue(verify_token_ttl());
        self.users
            .set_verify_token(user.id, &verification.token_hash, verification.expires_at)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to store verification token: {}", e)))?;

        self.notifications
            .send_email_verification_email(&user.email, &user.username, &verification.token);

        Ok(VERIFICATION_RESENT_MESSAGE)
    }

    pub async fn get_user_info(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))?
            .ok_or(AuthError::UserNotFound { id: user_id })?;

        Ok(user.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.users
            .get_user_by_email(email)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Failed to fetch user: {}", e)))
    }
}
