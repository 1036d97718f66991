//! 다운로더 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (날짜 형식, 기간 프리셋 등)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 사용자 입력 문제인지 확인합니다.
    pub fn is_user_error(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_) | CoreError::Config(_))
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error() {
        let err = CoreError::InvalidInput("2024-13-01".to_string());
        assert!(err.is_user_error());
        assert_eq!(err.to_string(), "잘못된 입력: 2024-13-01");

        let io = CoreError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_user_error());
    }
}
