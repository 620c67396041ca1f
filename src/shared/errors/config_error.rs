use thiserror::Error;

/// 설정 로딩 에러
/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}
