//! 주식 시세 배치 다운로더.
//!
//! 이 crate는 다음을 제공합니다:
//! - 티커 목록 입력 (엑셀, CSV, 직접 입력 텍스트)
//! - 워커 풀 기반 동시 다운로드와 1회 재시도
//! - 결과 저장 (종목별 엑셀, 요약 엑셀, ZIP 압축)
//! - 실행 통계

pub mod downloader;
pub mod error;
pub mod input;
pub mod job;
pub mod sink;
pub mod stats;

pub use downloader::{
    friendly_message, worker_count, BatchDownloader, BatchReport, DownloadOptions, ProgressEvent,
};
pub use error::{CollectorError, Result};
pub use input::{parse_free_text, read_ticker_file, HeaderAliases};
pub use job::{BatchJob, OutputMode, TickerSource};
pub use sink::{
    dashboard_workbook, sanitize_file_component, save_dashboard_workbook, sheet_name,
    write_series_csv, Artifact, ArchiveSink, DirectorySink, FileNaming, ResultSink,
};
pub use stats::RunSummary;
