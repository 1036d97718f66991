//! 외부 데이터 공급처 연동.
//!
//! 이 crate는 다음을 제공합니다:
//! - 과거 시세 Provider trait 및 Yahoo Finance 차트 API 구현
//! - 상장 종목 목록 Provider (KRX, 네이버 금융 시가총액, 위키백과 S&P 500)
//! - 지수/환율 별칭 및 종목명 → 티커 변환
//! - 최근 거래일 탐색

pub mod calendar;
pub mod error;
pub mod listing;
pub mod provider;
pub mod resolver;

pub use calendar::recent_business_day;
pub use error::{DataError, Result};
pub use listing::{
    save_listing_csv, KrxListingProvider, ListingMarket, ListingProvider, NaverMarketSumScraper,
    SymbolMetadata, WikipediaSp500Provider,
};
pub use provider::{HistoricalProvider, YahooChartProvider};
pub use resolver::{NameIndex, SymbolResolver, INDEX_ALIASES};
