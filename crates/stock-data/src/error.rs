//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 요청 실패 (연결, 타임아웃 등)
    #[error("HTTP 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    /// 데이터 공급처가 에러를 반환함
    #[error("{symbol} 조회 실패: {message}")]
    Provider { symbol: String, message: String },

    /// 조회는 성공했지만 데이터가 없음
    #[error("'{symbol}' 데이터를 찾을 수 없습니다 (No Data)")]
    NoData { symbol: String },

    /// 응답 파싱 실패
    #[error("응답 파싱 실패: {0}")]
    Parse(String),

    /// 종목 목록 수집 실패
    #[error("종목 목록 수집 실패: {0}")]
    Listing(String),

    /// 파일 입출력 실패
    #[error("파일 입출력 실패: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 쓰기 실패
    #[error("CSV 저장 실패: {0}")]
    Csv(#[from] csv::Error),
}

impl DataError {
    /// 다시 시도하면 성공할 수 있는 에러인지 확인합니다.
    ///
    /// 데이터 없음은 같은 요청을 반복해도 결과가 같으므로 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::Http(_) | DataError::Provider { .. } | DataError::Parse(_)
        )
    }

    /// 데이터 없음 에러인지 확인합니다.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DataError::NoData { .. })
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
