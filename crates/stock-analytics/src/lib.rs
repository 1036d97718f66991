//! 시세 분석.
//!
//! 이 crate는 다음을 제공합니다:
//! - 이동평균 (SMA, EMA)과 골든/데드 크로스 감지
//! - 상대거래량(RVOL), 일간 변동률
//! - 조회 화면에 필요한 요약 지표 ([`DashboardSummary`])

pub mod dashboard;
pub mod indicators;

pub use dashboard::{format_price, format_volume, DashboardRow, DashboardSummary, Market};
pub use indicators::{
    cross_signals, ema, pct_change, rvol, sma, CrossKind, CrossSignal, IndicatorError,
    IndicatorResult,
};
