use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod domains;
pub mod routes;
pub mod shared;

use crate::domains::auth::models::*;
use crate::shared::config::AppConfig;
use crate::shared::services::AppState;

// OpenAPI 스키마 정의: Swagger 문서 자동 생성
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::domains::auth::handlers::auth_handler::register,
        crate::domains::auth::handlers::auth_handler::login,
        crate::domains::auth::handlers::auth_handler::refresh_token,
        crate::domains::auth::handlers::auth_handler::logout,
        crate::domains::auth::handlers::auth_handler::logout_all,
        crate::domains::auth::handlers::auth_handler::get_me,
        crate::domains::auth::handlers::auth_handler::request_password_reset,
        crate::domains::auth::handlers::auth_handler::reset_password,
        crate::domains::auth::handlers::auth_handler::verify_email,
        crate::domains::auth::handlers::auth_handler::resend_verification
    ),
    components(schemas(
        Role,
        UserResponse,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        RefreshTokenRequest,
        TokenPairResponse,
        LogoutRequest,
        RequestPasswordResetRequest,
        ResetPasswordRequest,
        VerifyEmailRequest,
        ResendVerificationRequest
    )),
    modifiers(
        &SecurityAddon
    ),
    tags(
        (name = "Auth", description = "Authentication API endpoints")
    ),
    info(
        title = "Auth API",
        description = "Registration, login, refresh token rotation, password reset and email verification",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

// Security scheme 정의: Swagger UI에서 "Authorize" 버튼 추가
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// 전체 애플리케이션 Router (API + Swagger UI + CORS + 요청 로그)
pub fn create_app(app_state: AppState, config: &AppConfig) -> Router {
    // CORS: 프론트엔드 origin만 허용
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let origin = config.email.frontend_url.origin().ascii_serialization();
    match HeaderValue::from_str(&origin) {
        Ok(origin) => cors = cors.allow_origin(origin).allow_credentials(true),
        Err(_) => tracing::warn!(%origin, "frontend origin is not a valid header value, CORS disabled"),
    }

    Router::new()
        .merge(routes::create_router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
