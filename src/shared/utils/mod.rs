/// 공유 유틸리티 모듈
/// Shared Utilities Module
///
/// 역할:
/// - 토큰 생성/해싱
/// - API 응답 envelope
pub mod response;
pub mod token;

pub use response::*;
pub use token::*;
