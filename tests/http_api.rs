// =====================================================
// HTTP API 통합 테스트
// =====================================================
// Router 전체(검증, 인증 extractor, 응답 envelope, 에러 매핑)를
// tower::ServiceExt::oneshot으로 호출합니다.
// =====================================================

mod common;
use common::*;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use chrono::{Duration, Utc};
use auth_api::create_app;
use auth_api::shared::database::UserStore;
use auth_api::shared::utils::hash_token;

fn router(app: &TestApp) -> Router {
    create_app(app.state.clone(), &app.config)
}

async fn call_raw(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, bytes)
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>, bearer: Option<&str>) -> (StatusCode, Value) {
    let (status, bytes) = call_raw(router, method, uri, body, bearer).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn register_body(email: &str, username: &str) -> Value {
    json!({ "email": email, "password": TEST_PASSWORD, "username": username })
}

/// 테스트: register → login → refresh → logout → refresh(401) 전체 시나리오
#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = TestApp::new();
    let router = router(&app);

    // 1. 회원가입
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/register",
        Some(register_body("alice@example.com", "alice")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "USER");
    assert_eq!(body["data"]["isVerified"], false);
    assert!(body["data"].get("passwordHash").is_none());

    // 2. 로그인
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({ "email": "alice@example.com", "password": TEST_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access_token = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh_token = body["data"]["refreshToken"].as_str().unwrap().to_string();

    // 3. 내 정보
    let (status, body) = call(&router, Method::GET, "/api/v1/auth/me", None, Some(&access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    // 4. 토큰 갱신
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/refresh-token",
        Some(json!({ "refreshToken": refresh_token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh_token);

    // 5. 로그아웃
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/logout",
        Some(json!({ "refreshToken": rotated })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    // 6. 로그아웃한 토큰 / 이미 교체된 토큰 모두 401
    for token in [&rotated, &refresh_token] {
        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/auth/refresh-token",
            Some(json!({ "refreshToken": token })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

/// 테스트: 재설정 요청 응답은 계정 존재 여부와 상관없이 바이트 단위로 동일
#[tokio::test]
async fn test_password_reset_request_bodies_identical() {
    let app = TestApp::new();
    let router = router(&app);
    app.register("alice@example.com", "alice").await;

    let (known_status, known) = call_raw(
        &router,
        Method::POST,
        "/api/v1/auth/request-password-reset",
        Some(json!({ "email": "alice@example.com" })),
        None,
    )
    .await;
    let (unknown_status, unknown) = call_raw(
        &router,
        Method::POST,
        "/api/v1/auth/request-password-reset",
        Some(json!({ "email": "ghost@example.com" })),
        None,
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known, unknown);
}

/// 테스트: 로그인 실패 응답은 원인과 상관없이 동일
#[tokio::test]
async fn test_login_failure_bodies_identical() {
    let app = TestApp::new();
    let router = router(&app);
    app.register("alice@example.com", "alice").await;

    let (wrong_status, wrong) = call_raw(
        &router,
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({ "email": "alice@example.com", "password": "not-the-password" })),
        None,
    )
    .await;
    let (unknown_status, unknown) = call_raw(
        &router,
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD })),
        None,
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

/// 테스트: 중복 가입은 409 CONFLICT
#[tokio::test]
async fn test_duplicate_register_is_conflict() {
    let app = TestApp::new();
    let router = router(&app);
    app.register("alice@example.com", "alice").await;

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/register",
        Some(register_body("alice@example.com", "another")),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["message"], "User with this email or username already exists");
}

/// 테스트: 검증 실패는 서비스 호출 전에 400
#[tokio::test]
async fn test_invalid_bodies_are_bad_requests() {
    let app = TestApp::new();
    let router = router(&app);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/register",
        Some(json!({ "email": "not-an-email", "password": "short", "username": "ab" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("email"));

    // 필드 누락
    let (status, _) = call(
        &router,
        Method::POST,
        "/api/v1/auth/refresh-token",
        Some(json!({ "token": "abc" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.sent_count(), 0);
}

/// 테스트: 인증이 필요한 엔드포인트
#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = TestApp::new();
    let router = router(&app);

    let (status, body) = call(&router, Method::GET, "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = call(&router, Method::GET, "/api/v1/auth/me", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&router, Method::POST, "/api/v1/auth/logout-all", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// 테스트: 비밀번호 재설정 + 이메일 인증 HTTP 흐름
#[tokio::test]
async fn test_reset_and_verify_over_http() {
    let app = TestApp::new();
    let router = router(&app);
    app.register("alice@example.com", "alice").await;

    // 이메일 인증
    let verify_token = token_from_email(&app.wait_for_email("alice@example.com", "Verify Your Email").await);
    let (status, _) = call(
        &router,
        Method::POST,
        "/api/v1/auth/verify-email",
        Some(json!({ "token": verify_token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/resend-verification",
        Some(json!({ "email": "alice@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email is already verified");

    // 비밀번호 재설정
    call(
        &router,
        Method::POST,
        "/api/v1/auth/request-password-reset",
        Some(json!({ "email": "alice@example.com" })),
        None,
    )
    .await;
    let reset_token = token_from_email(&app.wait_for_email("alice@example.com", "Reset Your Password").await);

    let reset = json!({ "token": reset_token, "password": "brand-new-password" });
    let (status, _) = call(&router, Method::POST, "/api/v1/auth/reset-password", Some(reset.clone()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&router, Method::POST, "/api/v1/auth/reset-password", Some(reset), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired reset token");
}

/// 테스트: 이미 인증된 계정의 인증 요청은 400 BAD_REQUEST
#[tokio::test]
async fn test_verify_email_already_verified_over_http() {
    let app = TestApp::new();
    let router = router(&app);
    let user = app.register("alice@example.com", "alice").await;
    let token = token_from_email(&app.wait_for_email("alice@example.com", "Verify Your Email").await);
    app.auth().verify_email(&token).await.unwrap();

    app.store
        .set_verify_token(user.id, &hash_token("leftover-token"), Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/v1/auth/verify-email",
        Some(json!({ "token": "leftover-token" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["message"], "Email is already verified");
}

/// 테스트: 모든 기기 로그아웃
#[tokio::test]
async fn test_logout_all_over_http() {
    let app = TestApp::new();
    let router = router(&app);
    app.register("alice@example.com", "alice").await;
    let first = app.login("alice@example.com", TEST_PASSWORD).await;
    let second = app.login("alice@example.com", TEST_PASSWORD).await;

    let (status, _) = call(&router, Method::POST, "/api/v1/auth/logout-all", None, Some(&first.access_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &router,
        Method::POST,
        "/api/v1/auth/refresh-token",
        Some(json!({ "refreshToken": second.refresh_token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// 테스트: OpenAPI 문서 제공
#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new();
    let router = router(&app);

    let (status, body) = call(&router, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/v1/auth/refresh-token").is_some());
}
