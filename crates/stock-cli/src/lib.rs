//! `stockdl` CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 티커 목록 배치 다운로드
//! - 상장 종목 목록 수집
//! - 종목 조회 (요약 지표, 이동평균, 골든/데드 크로스)
//! - 지수 시세 CSV 저장
//! - 최근 거래일 확인

pub mod commands;
pub mod ui;
