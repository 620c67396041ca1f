// 애플리케이션 설정
// Application configuration
//
// 프로세스 시작 시 한 번 만들어서 각 서비스에 생성자로 전달합니다.
// (전역 상태 없음 → 테스트마다 다른 secret 사용 가능)

use crate::shared::errors::ConfigError;
use std::str::FromStr;
use url::Url;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

/// 토큰 수명 상한 (10년)
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// JWT 설정
/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access Token 수명 (초)
    pub access_ttl_secs: u64,
    /// Refresh Token 수명 (초)
    pub refresh_ttl_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
        }
    }
}

/// 메일 발신 설정
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: String,
    pub from_name: String,
    /// 메일 본문 링크의 기준 URL
    pub frontend_url: Url,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: "noreply@example.com".to_string(),
            from_name: "Auth API".to_string(),
            frontend_url: Url::parse("http://localhost:3000").expect("static url is valid"),
        }
    }
}

/// SMTP 접속 설정
/// SMTP relay settings
///
/// SMTP_USER와 SMTP_PASSWORD가 모두 있을 때만 만들어집니다.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// 465면 암묵적 TLS, 그 외는 STARTTLS
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Argon2 비용 설정
/// Argon2 cost parameters
#[derive(Debug, Clone, Copy)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// 없으면 인메모리 저장소로 실행
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    /// 없으면 메일은 로그로만 남음
    pub smtp: Option<SmtpConfig>,
    pub password: PasswordConfig,
    /// 만료된 Refresh Token 정리 주기 (초)
    pub ledger_cleanup_interval_secs: u64,
    /// 신뢰하는 리버스 프록시 뒤에서만 true
    pub trust_proxy_headers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt: JwtConfig::default(),
            email: EmailConfig::default(),
            smtp: None,
            password: PasswordConfig::default(),
            ledger_cleanup_interval_secs: 3600,
            trust_proxy_headers: false,
        }
    }
}

impl AppConfig {
    /// 환경 변수에서 설정 로딩
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 key → value 조회 함수로 설정 로딩
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.trim().is_empty() => {
                return Err(ConfigError::Empty { key: "JWT_SECRET" });
            }
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set, using the insecure default secret");
                defaults.jwt.secret
            }
        };

        let frontend_url = match lookup("FRONTEND_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                key: "FRONTEND_URL",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.email.frontend_url,
        };

        let smtp = match (non_empty(&lookup, "SMTP_USER"), non_empty(&lookup, "SMTP_PASSWORD")) {
            (Some(user), Some(password)) => Some(SmtpConfig {
                host: non_empty(&lookup, "SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                user,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            jwt: JwtConfig {
                secret,
                access_ttl_secs: parse_ttl(&lookup, "JWT_ACCESS_EXPIRATION", defaults.jwt.access_ttl_secs)?,
                refresh_ttl_secs: parse_ttl(&lookup, "JWT_REFRESH_EXPIRATION", defaults.jwt.refresh_ttl_secs)?,
            },
            email: EmailConfig {
                from: lookup("EMAIL_FROM").unwrap_or(defaults.email.from),
                from_name: lookup("EMAIL_FROM_NAME").unwrap_or(defaults.email.from_name),
                frontend_url,
            },
            smtp,
            password: PasswordConfig {
                memory_kib: parse_or(&lookup, "PASSWORD_MEMORY_KIB", defaults.password.memory_kib)?,
                iterations: parse_or(&lookup, "PASSWORD_ITERATIONS", defaults.password.iterations)?,
                parallelism: parse_or(&lookup, "PASSWORD_PARALLELISM", defaults.password.parallelism)?,
            },
            ledger_cleanup_interval_secs: parse_or(
                &lookup,
                "LEDGER_CLEANUP_INTERVAL_SECS",
                defaults.ledger_cleanup_interval_secs,
            )?,
            trust_proxy_headers: parse_or(&lookup, "TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

// 만료 시각 계산이 넘치지 않도록 1초 ~ 10년으로 제한
fn parse_ttl<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let ttl = parse_or(lookup, key, default)?;
    if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
        return Err(ConfigError::InvalidValue {
            key,
            value: ttl.to_string(),
            reason: format!("must be between 1 and {} seconds", MAX_TOKEN_TTL_SECS),
        });
    }

    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt.access_ttl_secs, 900);
        assert_eq!(config.jwt.refresh_ttl_secs, 604_800);
        assert!(config.database_url.is_none());
        assert_eq!(config.email.frontend_url.as_str(), "http://localhost:3000/");
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cr3t"),
            ("JWT_ACCESS_EXPIRATION", "60"),
            ("FRONTEND_URL", "https://app.example.com"),
            ("DATABASE_URL", "postgresql://localhost/auth"),
            ("TRUST_PROXY_HEADERS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.jwt.secret, "s3cr3t");
        assert_eq!(config.jwt.access_ttl_secs, 60);
        assert_eq!(config.email.frontend_url.host_str(), Some("app.example.com"));
        assert_eq!(config.database_url.as_deref(), Some("postgresql://localhost/auth"));
        assert!(config.trust_proxy_headers);
    }

    #[test]
    fn rejects_bad_numbers_and_empty_secret() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty { key: "JWT_SECRET" }));
    }

    #[test]
    fn rejects_token_ttls_outside_bounds() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_REFRESH_EXPIRATION", "10000000000000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "JWT_REFRESH_EXPIRATION", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("JWT_ACCESS_EXPIRATION", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "JWT_ACCESS_EXPIRATION", .. }));

        let max = MAX_TOKEN_TTL_SECS.to_string();
        let config = AppConfig::from_lookup(lookup_from(&[("JWT_REFRESH_EXPIRATION", max.as_str())])).unwrap();
        assert_eq!(config.jwt.refresh_ttl_secs, MAX_TOKEN_TTL_SECS);
    }

    #[test]
    fn smtp_requires_both_credentials() {
        let config = AppConfig::from_lookup(lookup_from(&[("SMTP_USER", "mailer")])).unwrap();
        assert!(config.smtp.is_none());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("SMTP_USER", "mailer"),
            ("SMTP_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 587);
        assert!(!format!("{:?}", smtp).contains("hunter2"));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USER", "mailer"),
            ("SMTP_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "mail.example.com");
        assert_eq!(smtp.port, 465);
    }
}
