use crate::shared::config::PasswordConfig;
use crate::shared::errors::AuthError;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use argon2::password_hash::{rand_core::OsRng, SaltString};

/// 비밀번호 해싱 서비스 (Argon2id, salt 포함)
/// Password hashing service
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new(config: &PasswordConfig) -> Result<Self, AuthError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AuthError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHashingFailed(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    /// 비밀번호 불일치는 InvalidCredentials, 저장된 해시 손상은 내부 에러
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<(), AuthError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::PasswordVerificationFailed(format!("Invalid password hash: {}", e)))?;

        // 해시 문자열에 기록된 파라미터로 검증 (비용 설정이 바뀌어도 기존 해시 유효)
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordService {
        PasswordService::new(&PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_is_salted_and_verifiable() {
        let service = cheap();

        let first = service.hash_password("pw12345678").unwrap();
        let second = service.hash_password("pw12345678").unwrap();

        assert_ne!(first, "pw12345678");
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(service.verify_password("pw12345678", &first).is_ok());
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let service = cheap();
        let hash = service.hash_password("pw12345678").unwrap();

        assert!(matches!(
            service.verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.verify_password("pw12345678", "not-a-phc-string"),
            Err(AuthError::PasswordVerificationFailed(_))
        ));
    }
}
