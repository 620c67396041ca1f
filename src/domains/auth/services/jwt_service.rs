// src/domains/auth/services/jwt_service.rs
use crate::shared::errors::{AuthError, TokenError};
use crate::domains::auth::models::jwt::{Claims, TokenSubject};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use jsonwebtoken::errors::ErrorKind;

/// JWT 서비스
/// JWT Service for token generation and verification
///
/// Access Token과 Refresh Token은 같은 키/같은 방식으로 서명하고 수명만 다릅니다.
/// Refresh Token의 최종 유효성은 서명이 아니라 Ledger 행의 존재 여부로 결정됩니다.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// JWT Service 생성
    /// Create JWT Service
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// 토큰 서명
    /// Sign claims for `subject` that expire after `ttl_seconds`
    pub fn sign(&self, subject: &TokenSubject, ttl_seconds: u64) -> Result<String, AuthError> {
        self.encode_claims(&Claims::new(subject, ttl_seconds))
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// 토큰 검증 (서명 + 만료)
    /// Verify signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    /// Access Token 검증 (인증 미들웨어용)
    /// Verify Access Token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify(token).map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::models::Role;
    use uuid::Uuid;

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: Uuid::now_v7(),
            email: "a@x.com".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn sign_then_verify_returns_the_subject() {
        let codec = JwtService::new("test-secret");
        let subject = subject();

        let token = codec.sign(&subject, 900).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.subject(), subject);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn tokens_minted_back_to_back_differ() {
        let codec = JwtService::new("test-secret");
        let subject = subject();

        let a = codec.sign(&subject, 900).unwrap();
        let b = codec.sign(&subject, 900).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn wrong_secret_is_an_invalid_signature() {
        let token = JwtService::new("secret-a").sign(&subject(), 900).unwrap();
        let err = JwtService::new("secret-b").verify(&token).unwrap_err();

        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = JwtService::new("test-secret");
        let mut claims = Claims::new(&subject(), 900);
        claims.iat -= 3600;
        claims.exp = claims.iat + 60;

        let token = codec.encode_claims(&claims).unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = JwtService::new("test-secret");

        assert!(matches!(
            codec.verify("invalid.token.here"),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            codec.verify_access_token("invalid.token.here"),
            Err(AuthError::InvalidToken)
        ));
    }
}
