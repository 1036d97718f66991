//! 배치 작업 통합 테스트: 입력 파일 → 동시 다운로드 → 엑셀/요약/압축 파일.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use stock_collector::{
    BatchDownloader, BatchJob, DownloadOptions, FileNaming, OutputMode, TickerSource,
};
use stock_core::{DateRange, PriceBar, PriceSeries, RetryPolicy};
use stock_data::{DataError, HistoricalProvider};

/// 005930, AAPL은 데이터가 있고 나머지는 데이터 없음.
struct FixtureProvider;

#[async_trait]
impl HistoricalProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, symbol: &str, range: &DateRange) -> stock_data::Result<PriceSeries> {
        let close = match symbol {
            "005930" => dec!(79600),
            "AAPL" => dec!(185.64),
            _ => {
                return Err(DataError::NoData {
                    symbol: symbol.to_string(),
                })
            }
        };
        let bars = (0..range.days())
            .map(|i| PriceBar {
                date: range.start + chrono::Duration::days(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1_000,
            })
            .collect();
        Ok(PriceSeries::new(symbol, bars))
    }
}

fn downloader() -> BatchDownloader {
    let options = DownloadOptions::default()
        .with_max_workers(4)
        .with_retry(RetryPolicy::once(Duration::from_millis(1)));
    BatchDownloader::new(Arc::new(FixtureProvider), options)
}

fn range() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_directory_job_writes_files_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tickers.csv");
    std::fs::write(
        &input,
        "티커,티커명\n005930,삼성전자\nAAPL,애플\n999999,없는종목\n",
    )
    .unwrap();
    let output = dir.path().join("stock_price");

    let job = BatchJob::new(TickerSource::File(input), range(), &output)
        .with_mode(OutputMode::Directory(FileNaming::Dated));
    let report = job.run(&downloader(), None).await.unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.summary.success, 2);
    assert_eq!(report.summary.failed, 1);

    let samsung = output.join("삼성전자_2024-01-02_2024-01-04.xlsx");
    assert!(samsung.is_file());
    assert!(output.join("애플_2024-01-02_2024-01-04.xlsx").is_file());
    assert!(!output.join("없는종목_2024-01-02_2024-01-04.xlsx").exists());

    let mut workbook = open_workbook_auto(&samsung).unwrap();
    let sheet = workbook.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(sheet.height(), 4);
    assert_eq!(sheet.get((1, 4)), Some(&Data::Float(79600.0)));

    assert_eq!(report.outputs.len(), 1);
    let mut summary = open_workbook_auto(&report.outputs[0]).unwrap();
    let rows = summary.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(rows.height(), 4);

    let failed_row = (1..4)
        .find(|&r| rows.get((r, 0)) == Some(&Data::String("999999".to_string())))
        .unwrap();
    assert_eq!(rows.get((failed_row, 2)), Some(&Data::String("Failed".to_string())));
    assert_eq!(
        rows.get((failed_row, 3)),
        Some(&Data::String(
            "'999999' 데이터를 찾을 수 없습니다 (No Data)".to_string()
        ))
    );
}

#[tokio::test]
async fn test_archive_job_bundles_entries() {
    let dir = tempfile::tempdir().unwrap();
    let job = BatchJob::new(
        TickerSource::Text("005930,삼성전자; AAPL,애플; ZZZZ,없음".to_string()),
        range(),
        dir.path(),
    )
    .with_mode(OutputMode::Archive);

    let report = job.run(&downloader(), None).await.unwrap();
    assert_eq!(report.summary.success, 2);
    assert_eq!(report.outputs.len(), 2);

    let archive_path = &report.outputs[0];
    let file_name = archive_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("stock_data_"));
    assert!(file_name.ends_with(".zip"));

    let archive = zip::ZipArchive::new(std::fs::File::open(archive_path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "download_summary.xlsx".to_string(),
            "삼성전자_005930.xlsx".to_string(),
            "애플_AAPL.xlsx".to_string(),
        ]
    );
}
