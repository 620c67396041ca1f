// Auth domain routes
// 인증 도메인 라우터
use axum::{routing::{get, post}, Router};
use crate::domains::auth::handlers::auth_handler;
use crate::shared::services::AppState;

/// Create authentication router
/// 인증 라우터 생성
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth_handler::register))
        .route("/login", post(auth_handler::login))
        .route("/refresh-token", post(auth_handler::refresh_token))
        .route("/logout", post(auth_handler::logout))
        .route("/logout-all", post(auth_handler::logout_all))
        .route("/me", get(auth_handler::get_me))
        .route("/request-password-reset", post(auth_handler::request_password_reset))
        .route("/reset-password", post(auth_handler::reset_password))
        .route("/verify-email", post(auth_handler::verify_email))
        .route("/resend-verification", post(auth_handler::resend_verification))
}
