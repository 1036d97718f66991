//! 과거 시세 Provider.
//!
//! ## Yahoo Finance
//! - `YahooChartProvider`: v8 chart API 일봉 조회
//! - 한국 6자리 코드는 `.KS` → `.KQ` 순서로 시도
//! - 지수/환율 별칭(US500, IXIC, USD/KRW 등)을 Yahoo 심볼로 변환

pub mod yahoo;

use async_trait::async_trait;
use stock_core::{DateRange, PriceSeries};

use crate::Result;

pub use yahoo::{yahoo_candidates, YahooChartProvider};

/// 과거 시세 데이터 Provider trait.
///
/// 데이터가 없는 경우 빈 시계열(`Ok`) 또는 [`DataError::NoData`]를 반환할 수 있으며,
/// 호출하는 쪽은 둘 다 "데이터 없음"으로 취급해야 합니다.
///
/// [`DataError::NoData`]: crate::DataError::NoData
#[async_trait]
pub trait HistoricalProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 기간 내 일봉 시계열 조회.
    async fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries>;
}
