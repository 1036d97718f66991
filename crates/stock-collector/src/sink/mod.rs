//! 다운로드 결과 저장소.
//!
//! - `DirectorySink`: 종목별 엑셀 파일을 폴더에 저장하고 요약 파일을 남깁니다.
//! - `ArchiveSink`: 종목별 엑셀을 메모리에 모았다가 ZIP 하나로 묶습니다.
//!
//! 각 작업은 자기 결과물([`Artifact`])만 만들고, 결과물 목록은 다운로더가 소유합니다.
//! 마지막에 [`ResultSink::finish`]가 요약 파일과 압축 파일을 씁니다.

pub mod archive;
pub mod csv_file;
pub mod naming;
pub mod xlsx;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use stock_core::{DateRange, FetchResult, PriceSeries, TickerRequest};
use tracing::{debug, info};

use crate::{CollectorError, Result};

pub use archive::ArchiveSink;
pub use csv_file::write_series_csv;
pub use naming::{dedupe_file_name, sanitize_file_component, sheet_name, FileNaming};
pub use xlsx::{dashboard_workbook, save_dashboard_workbook, series_workbook, summary_workbook};

/// 종목 하나를 저장한 결과물.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// 디스크에 저장된 파일
    File(PathBuf),
    /// 메모리 버퍼 (압축 파일 항목)
    Buffer { name: String, bytes: Vec<u8> },
}

impl Artifact {
    /// 결과물 이름 (파일명 또는 압축 항목명).
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Buffer { name, .. } => name.clone(),
        }
    }
}

/// 결과 저장소 trait.
///
/// `write_series`는 블로킹 I/O이므로 다운로더가 `spawn_blocking`에서 호출합니다.
pub trait ResultSink: Send + Sync {
    /// 종목 하나의 시세 저장.
    fn write_series(
        &self,
        request: &TickerRequest,
        range: &DateRange,
        series: &PriceSeries,
    ) -> Result<Artifact>;

    /// 모든 요청이 끝난 뒤 요약을 쓰고 최종 산출물 경로를 반환합니다.
    fn finish(&self, results: &[FetchResult], artifacts: Vec<Artifact>) -> Result<Vec<PathBuf>>;
}

/// 출력 폴더를 만듭니다. 실패하면 배치를 시작하지 않습니다.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| CollectorError::filesystem(dir, e))
}

/// 폴더에 종목별 엑셀을 저장하는 Sink.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    naming: FileNaming,
    summary_name: String,
    /// 같은 이름의 요청이 같은 파일을 덮어쓰지 않도록 사용 중인 파일명 기록
    claimed: Mutex<HashSet<String>>,
}

impl DirectorySink {
    /// 출력 폴더를 만들고 Sink를 생성합니다.
    ///
    /// 요약 파일명은 `download_log_{오늘}.xlsx`.
    pub fn create(dir: impl Into<PathBuf>, naming: FileNaming) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        let today = chrono::Local::now().date_naive();
        Ok(Self {
            dir,
            naming,
            summary_name: format!("download_log_{}.xlsx", today),
            claimed: Mutex::new(HashSet::new()),
        })
    }

    /// 요약 파일명 변경
    pub fn with_summary_name(mut self, name: impl Into<String>) -> Self {
        self.summary_name = name.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn claim(&self, file_name: &str) -> String {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        dedupe_file_name(file_name, &mut claimed)
    }
}

impl ResultSink for DirectorySink {
    fn write_series(
        &self,
        request: &TickerRequest,
        range: &DateRange,
        series: &PriceSeries,
    ) -> Result<Artifact> {
        let file_name = self.claim(&self.naming.file_name(request, range));
        let path = self.dir.join(&file_name);

        let mut workbook = series_workbook(&sheet_name(&request.display_name, &request.symbol), series)?;
        workbook.save(&path)?;

        debug!(path = %path.display(), rows = series.len(), "종목 파일 저장");
        Ok(Artifact::File(path))
    }

    fn finish(&self, results: &[FetchResult], artifacts: Vec<Artifact>) -> Result<Vec<PathBuf>> {
        let path = self.dir.join(&self.summary_name);
        let mut workbook = summary_workbook(results)?;
        workbook.save(&path)?;

        info!(
            path = %path.display(),
            files = artifacts.len(),
            rows = results.len(),
            "다운로드 요약 저장"
        );
        Ok(vec![path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stock_core::PriceBar;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn series() -> PriceSeries {
        PriceSeries::new(
            "AAPL",
            vec![PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: dec!(187.15),
                high: dec!(188.44),
                low: dec!(183.89),
                close: dec!(185.64),
                volume: 82_488_700,
            }],
        )
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("stock_price");
        let sink = DirectorySink::create(&out, FileNaming::Dated)
            .unwrap()
            .with_summary_name("download_log.xlsx");
        assert!(out.is_dir());

        let request = TickerRequest::new("AAPL", "애플");
        let first = sink.write_series(&request, &range(), &series()).unwrap();
        let second = sink.write_series(&request, &range(), &series()).unwrap();

        assert_eq!(first, Artifact::File(out.join("애플_2024-01-01_2024-01-31.xlsx")));
        assert_eq!(second.name(), "애플_2024-01-01_2024-01-31 (2).xlsx");

        let results = vec![FetchResult::success(&request, series())];
        let outputs = sink.finish(&results, vec![first, second]).unwrap();
        assert_eq!(outputs, vec![out.join("download_log.xlsx")]);
        assert!(outputs[0].is_file());
    }

    #[test]
    fn test_directory_sink_rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = DirectorySink::create(blocker.join("out"), FileNaming::Dated).unwrap_err();
        assert!(matches!(err, CollectorError::Filesystem { .. }));
    }
}
