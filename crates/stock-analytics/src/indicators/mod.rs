//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균
//! - **골든/데드 크로스**: 단기 이동평균과 장기 이동평균의 교차
//!
//! ## 거래량 지표
//! - **RVOL**: 당일 거래량 / 최근 N일 평균 거래량
//! - **변동률**: 전일 대비 종가 변동률

pub mod trend;
pub mod volume;

use thiserror::Error;

pub use trend::{cross_signals, detect_dead_cross, detect_golden_cross, ema, sma, CrossKind, CrossSignal};
pub use volume::{average_volume, pct_change, rvol};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;
