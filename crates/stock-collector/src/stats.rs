//! 실행 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use stock_core::FetchResult;

/// 배치 실행 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// 총 요청 수
    pub total: usize,
    /// 성공 수
    pub success: usize,
    /// 실패 수
    pub failed: usize,
    /// 저장된 총 행 수
    pub total_rows: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 결과 목록에서 통계를 집계합니다.
    pub fn from_results(results: &[FetchResult], elapsed: Duration) -> Self {
        let mut summary = Self {
            elapsed,
            ..Self::default()
        };
        for result in results {
            summary.record(result);
        }
        summary
    }

    /// 결과 하나를 반영합니다.
    pub fn record(&mut self, result: &FetchResult) {
        self.total += 1;
        if result.is_success() {
            self.success += 1;
            self.total_rows += result.series.as_ref().map(|s| s.len()).unwrap_or(0);
        } else {
            self.failed += 1;
        }
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            failed = self.failed,
            total_rows = self.total_rows,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "다운로드 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stock_core::{PriceBar, PriceSeries, TickerRequest};

    #[test]
    fn test_from_results() {
        let bar = PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: dec!(1),
            high: dec!(1),
            low: dec!(1),
            close: dec!(1),
            volume: 1,
        };
        let series = PriceSeries::new("AAPL", vec![bar.clone(), bar]);
        let results = vec![
            FetchResult::success(&TickerRequest::new("AAPL", "애플"), series),
            FetchResult::failed(&TickerRequest::new("ZZZZ", "없음"), "No Data"),
            FetchResult::failed(&TickerRequest::new("YYYY", "없음"), "No Data"),
            FetchResult::failed(&TickerRequest::new("XXXX", "없음"), "No Data"),
        ];

        let summary = RunSummary::from_results(&results, Duration::from_secs(3));
        assert_eq!(summary.total, 4);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.total_rows, 2);
        assert!((summary.success_rate() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_rate() {
        assert_eq!(RunSummary::new().success_rate(), 0.0);
    }
}
