//! # Stock Core
//!
//! 주식 데이터 다운로더의 핵심 도메인 타입을 제공합니다.
//!
//! 이 크레이트는 다른 크레이트 전반에서 사용되는 기본 타입을 제공합니다:
//! - 티커 요청, 조회 기간, 가격 시계열
//! - 종목별 다운로드 결과
//! - 재시도 정책
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use retry::{with_retry, RetryPolicy};
pub use types::*;
