//! 동시 배치 다운로더.
//!
//! 요청 목록을 워커 수만큼 동시에 처리합니다. 요청마다 정확히 하나의
//! [`FetchResult`]가 완료 순서대로 만들어지며, 종목별 실패는 배치를 중단하지 않습니다.
//!
//! 요청 하나의 처리 순서:
//! 1. 심볼 변환 (별칭, 종목명 → 코드)
//! 2. 재시도 정책에 따라 시세 조회 (데이터 없음은 재시도하지 않음)
//! 3. 빈 결과는 "No Data" 실패
//! 4. Sink에 저장 (블로킹 I/O는 `spawn_blocking`)
//!
//! 결과물 목록은 수집 루프가 소유하고, 마지막에 [`ResultSink::finish`]로 넘깁니다.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use stock_core::{
    with_retry, DateRange, DownloadConfig, FetchResult, FetchStatus, PriceSeries, RetryPolicy,
    TickerRequest,
};
use stock_data::{DataError, HistoricalProvider, SymbolResolver};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::sink::{Artifact, ResultSink};
use crate::stats::RunSummary;
use crate::Result;

/// 데이터 공급처 세션 만료 등으로 JSON 대신 다른 응답이 왔을 때 보여줄 메시지.
pub const SERVER_RESPONSE_MESSAGE: &str =
    "서버 응답 오류 (데이터 공급처 세션 만료 혹은 일시적 오류). 1~2분 후 다시 시도해 주세요.";

/// 다운로드 옵션.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// 워커 수 상한
    pub max_workers: usize,
    /// 시세 조회 재시도 정책
    pub retry: RetryPolicy,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self::from_config(&DownloadConfig::default())
    }
}

impl DownloadOptions {
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            retry: RetryPolicy::once(config.retry_delay()).with_max_attempts(config.max_attempts),
        }
    }

    /// 워커 수 상한 변경
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// 재시도 정책 변경
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// 실제 워커 수: `min(상한, CPU 수 + 4)`, 최소 1.
pub fn worker_count(cap: usize) -> usize {
    cap.min(num_cpus::get() + 4).max(1)
}

/// 에러 텍스트를 사용자용 메시지로 바꿉니다.
///
/// JSON 파싱 실패(`Expecting value`, `expected value`)는 공급처 세션 문제로 안내합니다.
pub fn friendly_message(error_text: &str) -> String {
    if error_text.contains("Expecting value") || error_text.contains("expected value") {
        SERVER_RESPONSE_MESSAGE.to_string()
    } else {
        error_text.to_string()
    }
}

fn no_data_message(ticker: &str) -> String {
    format!("'{}' 데이터를 찾을 수 없습니다 (No Data)", ticker)
}

/// 요청 하나가 끝날 때마다 보내는 진행 이벤트.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// 지금까지 끝난 요청 수
    pub completed: usize,
    pub total: usize,
    pub ticker: String,
    pub display_name: String,
    pub status: FetchStatus,
    pub message: String,
}

/// 배치 실행 결과.
#[derive(Debug)]
pub struct BatchReport {
    /// 완료 순서대로의 요청별 결과
    pub results: Vec<FetchResult>,
    /// Sink가 마지막에 만든 파일 (요약, 압축 파일)
    pub outputs: Vec<PathBuf>,
    pub summary: RunSummary,
}

impl BatchReport {
    /// 실패한 결과만.
    pub fn failures(&self) -> impl Iterator<Item = &FetchResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// 동시 배치 다운로더.
pub struct BatchDownloader {
    provider: Arc<dyn HistoricalProvider>,
    resolver: SymbolResolver,
    options: DownloadOptions,
}

impl BatchDownloader {
    /// 별칭 변환만 사용하는 다운로더를 생성합니다.
    pub fn new(provider: Arc<dyn HistoricalProvider>, options: DownloadOptions) -> Self {
        Self {
            provider,
            resolver: SymbolResolver::new(),
            options,
        }
    }

    /// 종목명 변환기 지정
    pub fn with_resolver(mut self, resolver: SymbolResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// 요청 목록 전체를 처리합니다.
    ///
    /// 종목별 실패는 결과에 남고, `Err`는 마지막 요약/압축 파일 작성이 실패한 경우에만 반환합니다.
    pub async fn run(
        &self,
        requests: Vec<TickerRequest>,
        range: DateRange,
        sink: Arc<dyn ResultSink>,
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<BatchReport> {
        let started = Instant::now();
        let total = requests.len();
        let workers = worker_count(self.options.max_workers);

        info!(
            provider = self.provider.name(),
            total,
            workers,
            range = %range,
            "배치 다운로드 시작"
        );

        let mut tasks = stream::iter(requests)
            .map(|request| self.process(request, range, Arc::clone(&sink)))
            .buffer_unordered(workers);

        let mut results = Vec::with_capacity(total);
        let mut artifacts = Vec::new();

        while let Some((result, artifact)) = tasks.next().await {
            let completed = results.len() + 1;
            if result.is_success() {
                debug!(ticker = %result.ticker, completed, total, message = %result.message, "다운로드 성공");
            } else {
                warn!(ticker = %result.ticker, completed, total, message = %result.message, "다운로드 실패");
            }

            if let Some(tx) = &progress {
                // 수신 측이 먼저 닫혀도 다운로드는 계속한다
                let _ = tx.send(ProgressEvent {
                    completed,
                    total,
                    ticker: result.ticker.clone(),
                    display_name: result.display_name.clone(),
                    status: result.status,
                    message: result.message.clone(),
                });
            }

            artifacts.extend(artifact);
            results.push(result);
        }
        drop(tasks);

        let summary = RunSummary::from_results(&results, started.elapsed());
        summary.log_summary("batch_download");

        let (outputs, results) = tokio::task::spawn_blocking(move || {
            let outputs = sink.finish(&results, artifacts);
            (outputs, results)
        })
        .await?;

        Ok(BatchReport {
            results,
            outputs: outputs?,
            summary,
        })
    }

    /// 요청 하나를 처리합니다. 결과물은 저장에 성공한 경우에만 반환합니다.
    async fn process(
        &self,
        request: TickerRequest,
        range: DateRange,
        sink: Arc<dyn ResultSink>,
    ) -> (FetchResult, Option<Artifact>) {
        let symbol = self.resolver.resolve(&request);
        if symbol != request.symbol {
            debug!(ticker = %request.symbol, symbol = %symbol, "심볼 변환");
        }

        let fetched = with_retry(
            &self.options.retry,
            |e: &DataError| e.is_retryable(),
            |_attempt| self.provider.fetch(&symbol, &range),
        )
        .await;

        match fetched {
            Ok(series) if series.is_empty() => {
                (FetchResult::failed(&request, no_data_message(&request.symbol)), None)
            }
            Ok(series) => self.store(request, range, series, sink).await,
            Err(e) if e.is_no_data() => {
                (FetchResult::failed(&request, no_data_message(&request.symbol)), None)
            }
            Err(e) => (FetchResult::failed(&request, friendly_message(&e.to_string())), None),
        }
    }

    async fn store(
        &self,
        request: TickerRequest,
        range: DateRange,
        series: PriceSeries,
        sink: Arc<dyn ResultSink>,
    ) -> (FetchResult, Option<Artifact>) {
        let write_request = request.clone();
        let written = tokio::task::spawn_blocking(move || {
            let artifact = sink.write_series(&write_request, &range, &series);
            (artifact, series)
        })
        .await;

        match written {
            Ok((Ok(artifact), series)) => (FetchResult::success(&request, series), Some(artifact)),
            Ok((Err(e), _)) => (FetchResult::failed(&request, e.to_string()), None),
            Err(e) => (FetchResult::failed(&request, format!("저장 작업 실패: {}", e)), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollectorError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use stock_core::PriceBar;

    #[derive(Clone)]
    enum Outcome {
        Bars(usize),
        Empty,
        NoData,
        Fail(&'static str),
    }

    /// 심볼별로 정해진 순서대로 응답하는 Provider.
    #[derive(Default)]
    struct ScriptedProvider {
        script: HashMap<String, Vec<Outcome>>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl ScriptedProvider {
        fn with(mut self, symbol: &str, outcomes: Vec<Outcome>) -> Self {
            self.script.insert(symbol.to_string(), outcomes);
            self
        }

        fn calls(&self, symbol: &str) -> usize {
            self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
        }
    }

    fn bars(symbol: &str, n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            symbol,
            (0..n)
                .map(|i| PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: dec!(100),
                    high: dec!(110),
                    low: dec!(90),
                    close: dec!(105),
                    volume: 1000,
                })
                .collect(),
        )
    }

    #[async_trait]
    impl HistoricalProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self, symbol: &str, _range: &DateRange) -> stock_data::Result<PriceSeries> {
            let attempt = {
                let mut calls = self.calls.lock().unwrap();
                let count = calls.entry(symbol.to_string()).or_insert(0);
                *count += 1;
                *count - 1
            };

            let outcomes = self.script.get(symbol).cloned().unwrap_or_else(|| vec![Outcome::Bars(3)]);
            let outcome = outcomes
                .get(attempt)
                .or_else(|| outcomes.last())
                .cloned()
                .unwrap_or(Outcome::Empty);

            match outcome {
                Outcome::Bars(n) => Ok(bars(symbol, n)),
                Outcome::Empty => Ok(PriceSeries::empty(symbol)),
                Outcome::NoData => Err(DataError::NoData {
                    symbol: symbol.to_string(),
                }),
                Outcome::Fail(message) => Err(DataError::Provider {
                    symbol: symbol.to_string(),
                    message: message.to_string(),
                }),
            }
        }
    }

    /// 메모리에 이름만 기록하는 Sink.
    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Vec<String>>,
        finished: Mutex<Option<(usize, usize)>>,
        fail_on: Option<String>,
    }

    impl ResultSink for MemorySink {
        fn write_series(
            &self,
            request: &TickerRequest,
            _range: &DateRange,
            series: &PriceSeries,
        ) -> Result<Artifact> {
            if self.fail_on.as_deref() == Some(request.symbol.as_str()) {
                return Err(CollectorError::Spreadsheet("disk full".to_string()));
            }
            self.written.lock().unwrap().push(request.symbol.clone());
            Ok(Artifact::Buffer {
                name: format!("{}.xlsx", request.symbol),
                bytes: vec![0; series.len()],
            })
        }

        fn finish(&self, results: &[FetchResult], artifacts: Vec<Artifact>) -> Result<Vec<PathBuf>> {
            *self.finished.lock().unwrap() = Some((results.len(), artifacts.len()));
            Ok(vec![PathBuf::from("summary.xlsx")])
        }
    }

    fn options() -> DownloadOptions {
        DownloadOptions::default()
            .with_max_workers(4)
            .with_retry(RetryPolicy::once(Duration::from_millis(1)))
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn result_for<'a>(report: &'a BatchReport, ticker: &str) -> &'a FetchResult {
        report.results.iter().find(|r| r.ticker == ticker).unwrap()
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(0), 1);
        assert_eq!(worker_count(1), 1);
        assert_eq!(worker_count(10_000), num_cpus::get() + 4);
    }

    #[test]
    fn test_friendly_message() {
        assert_eq!(
            friendly_message("응답 파싱 실패: expected value at line 1 column 1"),
            SERVER_RESPONSE_MESSAGE
        );
        assert_eq!(friendly_message("Expecting value: line 1"), SERVER_RESPONSE_MESSAGE);
        assert_eq!(friendly_message("HTTP 500"), "HTTP 500");
    }

    #[tokio::test]
    async fn test_one_result_per_request() {
        let provider = Arc::new(ScriptedProvider::default());
        let sink = Arc::new(MemorySink::default());
        let downloader = BatchDownloader::new(provider, options());

        let requests: Vec<TickerRequest> = (0..10)
            .map(|i| TickerRequest::new(format!("T{}", i), format!("종목{}", i)))
            .collect();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let report = downloader
            .run(requests, range(), sink.clone(), Some(tx))
            .await
            .unwrap();

        assert_eq!(report.results.len(), 10);
        assert_eq!(report.summary.success, 10);
        assert_eq!(report.summary.total_rows, 30);
        assert_eq!(report.outputs, vec![PathBuf::from("summary.xlsx")]);
        assert_eq!(*sink.finished.lock().unwrap(), Some((10, 10)));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 10);
        assert_eq!(events.last().unwrap().completed, 10);
        assert!(events.iter().all(|e| e.total == 10));
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let provider = Arc::new(
            ScriptedProvider::default().with("AAPL", vec![Outcome::Fail("503"), Outcome::Bars(5)]),
        );
        let downloader = BatchDownloader::new(provider.clone(), options());

        let report = downloader
            .run(
                vec![TickerRequest::new("AAPL", "애플")],
                range(),
                Arc::new(MemorySink::default()),
                None,
            )
            .await
            .unwrap();

        let result = result_for(&report, "AAPL");
        assert!(result.is_success());
        assert_eq!(result.message, "5건 완료");
        assert_eq!(provider.calls("AAPL"), 2);
    }

    #[tokio::test]
    async fn test_two_failures_report_second_error() {
        let provider = Arc::new(ScriptedProvider::default().with(
            "TSLA",
            vec![Outcome::Fail("first"), Outcome::Fail("second")],
        ));
        let downloader = BatchDownloader::new(provider.clone(), options());

        let report = downloader
            .run(
                vec![TickerRequest::new("TSLA", "테슬라")],
                range(),
                Arc::new(MemorySink::default()),
                None,
            )
            .await
            .unwrap();

        let result = result_for(&report, "TSLA");
        assert_eq!(result.status, FetchStatus::Failed);
        assert!(result.message.contains("second"));
        assert_eq!(provider.calls("TSLA"), 2);
    }

    #[tokio::test]
    async fn test_no_data_is_not_retried() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .with("999999", vec![Outcome::NoData])
                .with("ZZZZ", vec![Outcome::Empty]),
        );
        let sink = Arc::new(MemorySink::default());
        let downloader = BatchDownloader::new(provider.clone(), options());

        let report = downloader
            .run(
                vec![
                    TickerRequest::new("999999", "없는종목"),
                    TickerRequest::new("ZZZZ", "빈종목"),
                ],
                range(),
                sink.clone(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            result_for(&report, "999999").message,
            "'999999' 데이터를 찾을 수 없습니다 (No Data)"
        );
        assert_eq!(
            result_for(&report, "ZZZZ").message,
            "'ZZZZ' 데이터를 찾을 수 없습니다 (No Data)"
        );
        assert_eq!(provider.calls("999999"), 1);
        assert_eq!(provider.calls("ZZZZ"), 1);
        assert!(sink.written.lock().unwrap().is_empty());
        assert_eq!(report.summary.failed, 2);
    }

    #[tokio::test]
    async fn test_sink_failure_becomes_failed_result() {
        let provider = Arc::new(ScriptedProvider::default());
        let sink = Arc::new(MemorySink {
            fail_on: Some("MSFT".to_string()),
            ..MemorySink::default()
        });
        let downloader = BatchDownloader::new(provider, options());

        let report = downloader
            .run(
                vec![TickerRequest::new("MSFT", "마이크로소프트"), TickerRequest::new("AAPL", "애플")],
                range(),
                sink.clone(),
                None,
            )
            .await
            .unwrap();

        let failed = result_for(&report, "MSFT");
        assert!(!failed.is_success());
        assert!(failed.message.contains("disk full"));
        assert!(result_for(&report, "AAPL").is_success());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(*sink.finished.lock().unwrap(), Some((2, 1)));
    }

    #[tokio::test]
    async fn test_aliases_are_resolved_before_fetch() {
        let provider = Arc::new(ScriptedProvider::default());
        let downloader = BatchDownloader::new(provider.clone(), options());

        let report = downloader
            .run(
                vec![TickerRequest::new("코스피", "코스피 지수")],
                range(),
                Arc::new(MemorySink::default()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(provider.calls("^KS11"), 1);
        // 결과에는 입력한 티커가 남는다
        assert_eq!(report.results[0].ticker, "코스피");
    }

    #[tokio::test]
    async fn test_duplicate_requests_processed_independently() {
        let provider = Arc::new(ScriptedProvider::default());
        let downloader = BatchDownloader::new(provider.clone(), options());

        let report = downloader
            .run(
                vec![TickerRequest::new("005930", "삼성전자"), TickerRequest::new("005930", "삼성전자")],
                range(),
                Arc::new(MemorySink::default()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.results.len(), 2);
        assert_eq!(provider.calls("005930"), 2);
    }
}
