use std::net::SocketAddr;
use axum::{
    extract::{ConnectInfo, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use crate::domains::auth::models::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshTokenRequest, RegisterRequest,
    RequestPasswordResetRequest, ResendVerificationRequest, ResetPasswordRequest,
    TokenPairResponse, UserResponse, VerifyEmailRequest,
};
use crate::shared::errors::AuthError;
use crate::shared::middleware::{AuthenticatedUser, ValidatedJson};
use crate::shared::services::AppState;
use crate::shared::utils::ApiResponse;

// X-Forwarded-For는 클라이언트가 임의로 넣을 수 있으므로
// 신뢰하는 프록시 뒤에서 실행할 때(TRUST_PROXY_HEADERS=true)만 사용
fn client_ip(
    headers: &HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    trust_forwarded: bool,
) -> Option<String> {
    let forwarded = trust_forwarded
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    forwarded.or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// 회원가입 핸들러
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or username already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AuthError> {
    let user = app_state.auth_state.auth_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(user, "User registered successfully")),
    ))
}

// 로그인 핸들러
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(app_state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AuthError> {
    let ip = client_ip(&headers, connect_info, app_state.trust_proxy_headers);
    let user_agent = user_agent(&headers);

    let response = app_state
        .auth_state
        .auth_service
        .login(request, ip, user_agent)
        .await?;

    Ok(Json(ApiResponse::success(response, "Login successful")))
}

/// 토큰 갱신 핸들러
/// Refresh token handler
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = TokenPairResponse),
        (status = 401, description = "Invalid or expired refresh token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenPairResponse>>, AuthError> {
    let tokens = app_state
        .auth_state
        .auth_service
        .refresh_token(&request.refresh_token)
        .await?;

    Ok(Json(ApiResponse::success(tokens, "Token refreshed successfully")))
}

/// 로그아웃 핸들러
/// Logout handler
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logout successful"),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    app_state
        .auth_state
        .auth_service
        .logout(&request.refresh_token)
        .await?;

    Ok(Json(ApiResponse::message_only("Logout successful")))
}

/// 모든 기기에서 로그아웃
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout-all",
    responses(
        (status = 200, description = "Logged out from all devices"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn logout_all(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    app_state
        .auth_state
        .auth_service
        .logout_all(authenticated_user.user_id)
        .await?;

    Ok(Json(ApiResponse::message_only("Logged out from all devices")))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "User info retrieved successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("BearerAuth" = [])
    ),
    tag = "Auth"
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UserResponse>>, AuthError> {
    let user = app_state
        .auth_state
        .auth_service
        .get_user_info(authenticated_user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(user, "User info retrieved successfully")))
}

/// 비밀번호 재설정 요청 (계정 존재 여부와 상관없이 같은 응답)
#[utoipa::path(
    post,
    path = "/api/v1/auth/request-password-reset",
    request_body = RequestPasswordResetRequest,
    responses(
        (status = 200, description = "Generic acknowledgement"),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn request_password_reset(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RequestPasswordResetRequest>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    let message = app_state
        .auth_state
        .auth_service
        .request_password_reset(&request.email)
        .await?;

    Ok(Json(ApiResponse::message_only(message)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successfully"),
        (status = 400, description = "Invalid or expired reset token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    app_state
        .auth_state
        .auth_service
        .reset_password(&request.token, &request.password)
        .await?;

    Ok(Json(ApiResponse::message_only("Password reset successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified successfully"),
        (status = 400, description = "Invalid, expired or already used verification token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn verify_email(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    app_state
        .auth_state
        .auth_service
        .verify_email(&request.token)
        .await?;

    Ok(Json(ApiResponse::message_only("Email verified successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-verification",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Generic acknowledgement"),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn resend_verification(
    State(app_state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<ApiResponse<()>>, AuthError> {
    let message = app_state
        .auth_state
        .auth_service
        .resend_verification_email(&request.email)
        .await?;

    Ok(Json(ApiResponse::message_only(message)))
}
