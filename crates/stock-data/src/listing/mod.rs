//! 상장 종목 목록 Provider.
//!
//! - `KrxListingProvider`: KRX 정보데이터시스템 (KOSPI/KOSDAQ)
//! - `NaverMarketSumScraper`: 네이버 금융 시가총액 페이지 스크래핑 (KOSPI/KOSDAQ)
//! - `WikipediaSp500Provider`: 위키백과 S&P 500 구성 종목 표

pub mod krx;
pub mod naver;
pub mod wikipedia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::{DataError, Result};

pub use krx::KrxListingProvider;
pub use naver::NaverMarketSumScraper;
pub use wikipedia::WikipediaSp500Provider;

/// 목록을 수집할 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingMarket {
    Kospi,
    Kosdaq,
    Sp500,
}

impl ListingMarket {
    /// 한국 시장 여부.
    pub fn is_korean(&self) -> bool {
        matches!(self, Self::Kospi | Self::Kosdaq)
    }

    /// CSV 기본 파일명.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Kospi => "kospi_list.csv",
            Self::Kosdaq => "kosdaq_list.csv",
            Self::Sp500 => "sp500_tickers_detailed.csv",
        }
    }

    /// Yahoo 심볼 접미사 (한국 시장만).
    pub fn yahoo_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Kospi => Some(".KS"),
            Self::Kosdaq => Some(".KQ"),
            Self::Sp500 => None,
        }
    }
}

impl fmt::Display for ListingMarket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kospi => write!(f, "KOSPI"),
            Self::Kosdaq => write!(f, "KOSDAQ"),
            Self::Sp500 => write!(f, "S&P500"),
        }
    }
}

impl FromStr for ListingMarket {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kospi" | "코스피" | "stk" => Ok(Self::Kospi),
            "kosdaq" | "코스닥" | "ksq" => Ok(Self::Kosdaq),
            "sp500" | "s&p500" | "us500" => Ok(Self::Sp500),
            _ => Err(DataError::Listing(format!(
                "지원하지 않는 시장: {}. 사용 가능: kospi, kosdaq, sp500",
                s
            ))),
        }
    }
}

/// 상장 종목 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    /// 티커 코드 (예: 005930, AAPL, BRK-B)
    pub ticker: String,
    /// 종목명/회사명
    pub name: String,
    /// 시장
    pub market: ListingMarket,
    /// 거래소 (KRX, KOSDAQ, NYSE 등)
    pub exchange: Option<String>,
    /// 섹터
    pub sector: Option<String>,
    /// 세부 업종
    pub sub_industry: Option<String>,
}

impl SymbolMetadata {
    /// 티커와 이름만 있는 한국 종목 정보.
    pub fn korean(ticker: impl Into<String>, name: impl Into<String>, market: ListingMarket) -> Self {
        let exchange = match market {
            ListingMarket::Kosdaq => "KOSDAQ",
            _ => "KRX",
        };
        Self {
            ticker: ticker.into(),
            name: name.into(),
            market,
            exchange: Some(exchange.to_string()),
            sector: None,
            sub_industry: None,
        }
    }
}

/// 상장 종목 목록 Provider trait.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 지원하는 시장.
    fn supported_markets(&self) -> Vec<ListingMarket>;

    /// 시장 하나의 전체 종목 조회.
    async fn fetch_market(&self, market: ListingMarket) -> Result<Vec<SymbolMetadata>>;

    /// 지원하는 모든 시장의 종목 조회.
    async fn fetch_all(&self) -> Result<Vec<SymbolMetadata>> {
        let mut all = Vec::new();
        for market in self.supported_markets() {
            let symbols = self.fetch_market(market).await?;
            info!(provider = self.name(), %market, count = symbols.len(), "종목 수집");
            all.extend(symbols);
        }
        Ok(all)
    }
}

/// 목록 수집용 HTTP 클라이언트 (타임아웃 30초)
pub(crate) fn listing_client(user_agent: &str) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// 종목 목록을 CSV로 저장합니다 (UTF-8 BOM 포함).
///
/// 한국 시장은 `종목코드,종목명`, S&P 500은 `Ticker,Company,Sector,Industry` 헤더를 씁니다.
/// 저장한 행 수를 반환합니다.
pub fn save_listing_csv(
    path: impl AsRef<Path>,
    market: ListingMarket,
    entries: &[SymbolMetadata],
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    // 엑셀에서 한글이 깨지지 않도록 BOM을 먼저 쓴다
    file.write_all("\u{feff}".as_bytes())?;

    let mut writer = csv::Writer::from_writer(file);
    if market.is_korean() {
        writer.write_record(["종목코드", "종목명"])?;
        for entry in entries {
            writer.write_record([entry.ticker.as_str(), entry.name.as_str()])?;
        }
    } else {
        writer.write_record(["Ticker", "Company", "Sector", "Industry"])?;
        for entry in entries {
            writer.write_record([
                entry.ticker.as_str(),
                entry.name.as_str(),
                entry.sector.as_deref().unwrap_or(""),
                entry.sub_industry.as_deref().unwrap_or(""),
            ])?;
        }
    }
    writer.flush()?;

    info!(path = %path.display(), %market, rows = entries.len(), "종목 목록 저장");
    Ok(entries.len())
}
