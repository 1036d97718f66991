//! 시세 CSV 저장 (지수 데이터 내보내기용).

use std::path::Path;

use stock_core::PriceSeries;
use tracing::debug;

use crate::{CollectorError, Result};

const CSV_HEADERS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// 시계열을 `Date,Open,High,Low,Close,Volume` CSV로 저장하고 행 수를 반환합니다.
pub fn write_series_csv(path: impl AsRef<Path>, series: &PriceSeries) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        super::ensure_dir(parent)?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| csv_error(path, e))?;

    for bar in &series.bars {
        writer
            .write_record([
                bar.date.to_string(),
                bar.open.normalize().to_string(),
                bar.high.normalize().to_string(),
                bar.low.normalize().to_string(),
                bar.close.normalize().to_string(),
                bar.volume.to_string(),
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| CollectorError::filesystem(path, e))?;

    debug!(path = %path.display(), rows = series.len(), "CSV 저장");
    Ok(series.len())
}

fn csv_error(path: &Path, err: csv::Error) -> CollectorError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(source) => CollectorError::filesystem(path, source),
            other => CollectorError::Spreadsheet(format!("{:?}", other)),
        }
    } else {
        CollectorError::Spreadsheet(err.to_string())
    }
}
