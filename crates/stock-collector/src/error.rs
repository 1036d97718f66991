//! 다운로더 에러 타입.
//!
//! 종목별 실패는 에러가 아니라 `FetchResult::failed`로 요약에 남습니다.
//! 여기 정의된 에러는 배치를 시작하기 전(입력, 출력 폴더) 또는
//! 결과 파일을 쓰는 도중에만 발생합니다.

use std::path::PathBuf;

use stock_core::CoreError;
use stock_data::DataError;
use thiserror::Error;

/// Collector 에러
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 입력 파일/텍스트 형식 오류 (필수 컬럼 없음 등)
    #[error("입력 형식 오류: {0}")]
    InputFormat(String),

    /// 출력 폴더 생성/파일 쓰기 실패
    #[error("파일 시스템 오류 ({}): {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 엑셀/CSV 작성 실패
    #[error("파일 작성 실패: {0}")]
    Spreadsheet(String),

    /// ZIP 압축 실패
    #[error("압축 파일 작성 실패: {0}")]
    Archive(String),

    /// 백그라운드 작업 실패 (저장 작업 패닉 등)
    #[error("작업 실행 실패: {0}")]
    Task(String),

    /// 데이터 공급처 에러
    #[error(transparent)]
    Data(#[from] DataError),

    /// 설정/입력값 에러
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CollectorError {
    /// 경로 정보가 포함된 파일 시스템 에러
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// 배치 시작 전에 사용자에게 바로 보여줘야 하는 에러인지 확인합니다.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::InputFormat(_) | Self::Filesystem { .. })
    }
}

impl From<rust_xlsxwriter::XlsxError> for CollectorError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CollectorError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<zip::result::ZipError> for CollectorError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

/// Collector 결과 타입
pub type Result<T> = std::result::Result<T, CollectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_errors() {
        let input = CollectorError::InputFormat("티커 컬럼 없음".to_string());
        assert!(input.is_setup_error());

        let fs = CollectorError::filesystem(
            "/readonly/stock_price",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(fs.is_setup_error());
        assert!(fs.to_string().contains("/readonly/stock_price"));

        assert!(!CollectorError::Archive("crc".to_string()).is_setup_error());
    }
}
