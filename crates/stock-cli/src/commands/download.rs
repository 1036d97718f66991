//! 티커 목록 배치 다운로드 명령어.
//!
//! 엑셀/CSV 파일 또는 직접 입력한 티커 목록을 동시에 다운로드하고,
//! 종목별 엑셀 파일과 다운로드 요약을 저장합니다.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use stock_collector::{
    BatchDownloader, BatchJob, BatchReport, DownloadOptions, FileNaming, OutputMode, TickerSource,
};
use stock_core::{parse_date, AppConfig, DateRange, PeriodPreset};
use stock_data::{
    KrxListingProvider, ListingProvider, NameIndex, SymbolResolver, YahooChartProvider,
};
use tracing::{info, warn};

use crate::ui::DownloadProgress;

/// 다운로드 명령 설정.
#[derive(Debug, Clone)]
pub struct DownloadCommand {
    /// 티커 목록 파일 (xlsx, xls, csv)
    pub file: Option<PathBuf>,
    /// 직접 입력 (`티커,이름; 티커,이름`)
    pub tickers: Option<String>,
    pub period: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub output: Option<PathBuf>,
    pub zip: bool,
    pub workers: Option<usize>,
    /// 종목명 입력을 코드로 바꾸기 위해 KRX 목록을 먼저 받음
    pub resolve_names: bool,
}

/// 조회 기간 결정.
///
/// - `--start`가 있으면 `start ~ end(기본: 오늘)`
/// - 없으면 `--period` 프리셋 (기본 1년)
pub fn resolve_range(
    period: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    let end = end.map(parse_date).transpose()?.unwrap_or(today);

    let range = match start {
        Some(start) => DateRange::new(parse_date(start)?, end)?,
        None => {
            let preset: PeriodPreset = period.unwrap_or("1y").parse()?;
            DateRange::preset(preset, end)
        }
    };
    Ok(range)
}

fn ticker_source(command: &DownloadCommand) -> Result<TickerSource> {
    match (&command.file, &command.tickers) {
        (Some(path), None) => Ok(TickerSource::File(path.clone())),
        (None, Some(text)) => Ok(TickerSource::Text(text.clone())),
        (Some(_), Some(_)) => anyhow::bail!("--file과 --tickers는 함께 쓸 수 없습니다"),
        (None, None) => anyhow::bail!("--file 또는 --tickers 중 하나를 지정하세요"),
    }
}

/// 배치 다운로드 실행.
pub async fn run_download(command: DownloadCommand, config: &AppConfig) -> Result<BatchReport> {
    let today = chrono::Local::now().date_naive();
    let range = resolve_range(
        command.period.as_deref(),
        command.start.as_deref(),
        command.end.as_deref(),
        today,
    )?;
    let source = ticker_source(&command)?;
    let output_dir = command
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.download.output_dir));

    let mut options = DownloadOptions::from_config(&config.download);
    if let Some(workers) = command.workers {
        options = options.with_max_workers(workers);
    }

    let provider = Arc::new(
        YahooChartProvider::from_config(&config.provider)
            .context("HTTP 클라이언트를 만들 수 없습니다")?,
    );
    let mut downloader = BatchDownloader::new(provider, options);
    if command.resolve_names {
        downloader = downloader.with_resolver(load_resolver(config).await);
    }

    let mode = if command.zip {
        OutputMode::Archive
    } else {
        OutputMode::Directory(FileNaming::Dated)
    };
    let job = BatchJob::new(source, range, &output_dir).with_mode(mode);

    println!("\n📥 주식 데이터 다운로드");
    println!("기간: {}", range);
    println!("저장 위치: {}", output_dir.display());
    println!();

    let progress = DownloadProgress::new(0)?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let ui = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            progress.record(&event);
        }
        progress.finish();
    });

    let report = job.run(&downloader, Some(tx)).await;
    // 송신 측이 모두 닫혀야 진행률 작업이 끝난다
    ui.await.context("진행률 표시 작업 실패")?;
    let report = report.context("다운로드를 시작할 수 없습니다")?;

    print_report(&report);
    Ok(report)
}

/// KRX 코스피/코스닥 목록으로 종목명 변환기를 만듭니다. 실패하면 별칭만 씁니다.
async fn load_resolver(config: &AppConfig) -> SymbolResolver {
    let krx = match KrxListingProvider::from_config(&config.listing, &config.provider) {
        Ok(krx) => krx,
        Err(e) => {
            warn!(error = %e, "KRX 클라이언트 생성 실패, 별칭만 사용");
            return SymbolResolver::new();
        }
    };

    match krx.fetch_all().await {
        Ok(entries) => {
            info!(count = entries.len(), "종목명 목록 로드");
            SymbolResolver::with_listing(NameIndex::new(entries))
        }
        Err(e) => {
            warn!(error = %e, "종목 목록 로드 실패, 별칭만 사용");
            SymbolResolver::new()
        }
    }
}

fn print_report(report: &BatchReport) {
    let summary = &report.summary;

    println!("\n{}", "=".repeat(60));
    println!("✅ 다운로드 완료!");
    println!("   전체: {}건", summary.total);
    println!("   성공: {}건", summary.success);
    println!("   실패: {}건", summary.failed);
    println!("   성공률: {:.1}%", summary.success_rate());
    println!("   소요 시간: {:.1}초", summary.elapsed.as_secs_f64());

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("\n실패 종목:");
        for result in failures {
            println!("   - {} ({}): {}", result.display_name, result.ticker, result.message);
        }
    }

    if !report.outputs.is_empty() {
        println!("\n저장된 파일:");
        for path in &report.outputs {
            println!("   📁 {}", path.display());
        }
    }
    println!("{}\n", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_default_period() {
        let range = resolve_range(None, None, None, date(2024, 6, 30)).unwrap();
        assert_eq!(range.end, date(2024, 6, 30));
        assert_eq!(range.start, date(2023, 7, 1));
    }

    #[test]
    fn test_resolve_range_preset() {
        let range = resolve_range(Some("3y"), None, Some("2024-01-10"), date(2024, 6, 30)).unwrap();
        assert_eq!(range.end, date(2024, 1, 10));
        assert_eq!(range.start, date(2024, 1, 10) - chrono::Duration::days(365 * 3));
    }

    #[test]
    fn test_resolve_range_explicit_dates() {
        let range =
            resolve_range(Some("10y"), Some("2024-01-01"), Some("2024-03-31"), date(2024, 6, 30))
                .unwrap();
        assert_eq!(range, DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap());

        assert!(resolve_range(None, Some("2024-05-01"), Some("2024-04-01"), date(2024, 6, 30)).is_err());
        assert!(resolve_range(Some("2y"), None, None, date(2024, 6, 30)).is_err());
        assert!(resolve_range(None, Some("2024/01/01"), None, date(2024, 6, 30)).is_err());
    }

    #[test]
    fn test_ticker_source_requires_exactly_one() {
        let base = DownloadCommand {
            file: None,
            tickers: None,
            period: None,
            start: None,
            end: None,
            output: None,
            zip: false,
            workers: None,
            resolve_names: false,
        };
        assert!(ticker_source(&base).is_err());

        let text = DownloadCommand {
            tickers: Some("005930,삼성전자".to_string()),
            ..base.clone()
        };
        assert!(matches!(ticker_source(&text).unwrap(), TickerSource::Text(_)));

        let both = DownloadCommand {
            file: Some(PathBuf::from("tickers.xlsx")),
            ..text
        };
        assert!(ticker_source(&both).is_err());
    }
}
