//! ZIP 압축 Sink.
//!
//! 종목별 엑셀을 메모리 버퍼로 만들고, 마지막에 `stock_data_{YYYYmmdd_HHMMSS}.zip` 하나에
//! 종목 파일과 `download_summary.xlsx`를 함께 담습니다. 요약 파일은
//! `summary_{YYYYmmdd_HHMMSS}.xlsx`로도 따로 저장합니다.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use stock_core::{DateRange, FetchResult, PriceSeries, TickerRequest};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{
    dedupe_file_name, ensure_dir, series_workbook, sheet_name, summary_workbook, Artifact,
    FileNaming, ResultSink,
};
use crate::{CollectorError, Result};

/// 압축 파일 안의 요약 항목 이름.
pub const ARCHIVE_SUMMARY_NAME: &str = "download_summary.xlsx";

/// ZIP 압축 Sink.
#[derive(Debug, Clone)]
pub struct ArchiveSink {
    dir: PathBuf,
    naming: FileNaming,
    timestamp: String,
}

impl ArchiveSink {
    /// 출력 폴더를 만들고 Sink를 생성합니다. 항목 이름은 `{종목명}_{티커}.xlsx`.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            naming: FileNaming::Plain,
            timestamp: chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
        })
    }

    /// 압축 파일 경로
    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(format!("stock_data_{}.zip", self.timestamp))
    }

    /// 별도 요약 파일 경로
    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(format!("summary_{}.xlsx", self.timestamp))
    }
}

impl ResultSink for ArchiveSink {
    fn write_series(
        &self,
        request: &TickerRequest,
        range: &DateRange,
        series: &PriceSeries,
    ) -> Result<Artifact> {
        let mut workbook = series_workbook(&sheet_name(&request.display_name, &request.symbol), series)?;
        let bytes = workbook.save_to_buffer()?;
        Ok(Artifact::Buffer {
            name: self.naming.file_name(request, range),
            bytes,
        })
    }

    fn finish(&self, results: &[FetchResult], artifacts: Vec<Artifact>) -> Result<Vec<PathBuf>> {
        let summary_bytes = summary_workbook(results)?.save_to_buffer()?;

        let archive_path = self.archive_path();
        let file = File::create(&archive_path)
            .map_err(|e| CollectorError::filesystem(&archive_path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut taken = HashSet::new();
        taken.insert(ARCHIVE_SUMMARY_NAME.to_string());
        let mut entries = 0usize;

        for artifact in artifacts {
            let (name, bytes) = match artifact {
                Artifact::Buffer { name, bytes } => (name, bytes),
                Artifact::File(path) => {
                    let bytes =
                        std::fs::read(&path).map_err(|e| CollectorError::filesystem(&path, e))?;
                    (Artifact::File(path).name(), bytes)
                }
            };
            let entry_name = dedupe_file_name(&name, &mut taken);
            zip.start_file(entry_name.as_str(), options)?;
            zip.write_all(&bytes)
                .map_err(|e| CollectorError::Archive(e.to_string()))?;
            debug!(entry = %entry_name, bytes = bytes.len(), "압축 항목 추가");
            entries += 1;
        }

        zip.start_file(ARCHIVE_SUMMARY_NAME, options)?;
        zip.write_all(&summary_bytes)
            .map_err(|e| CollectorError::Archive(e.to_string()))?;
        zip.finish()?;

        let summary_path = self.summary_path();
        std::fs::write(&summary_path, &summary_bytes)
            .map_err(|e| CollectorError::filesystem(&summary_path, e))?;

        info!(
            archive = %archive_path.display(),
            entries,
            rows = results.len(),
            "압축 파일 저장"
        );
        Ok(vec![archive_path, summary_path])
    }
}
