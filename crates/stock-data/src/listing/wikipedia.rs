//! 위키백과 S&P 500 구성 종목 표.
//!
//! 페이지의 첫 번째 표에서 Symbol, Security, GICS Sector, GICS Sub-Industry 열을 읽습니다.
//! Yahoo 심볼 규칙에 맞춰 `BRK.B` 같은 티커는 `BRK-B`로 바꿉니다.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use stock_core::{ListingConfig, ProviderConfig};
use tracing::info;

use super::{listing_client, ListingMarket, ListingProvider, SymbolMetadata};
use crate::{DataError, Result};

/// 위키백과 S&P 500 Provider.
#[derive(Debug, Clone)]
pub struct WikipediaSp500Provider {
    client: Client,
    url: String,
}

impl WikipediaSp500Provider {
    pub fn new() -> Result<Self> {
        Self::from_config(&ListingConfig::default(), &ProviderConfig::default())
    }

    pub fn from_config(listing: &ListingConfig, provider: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: listing_client(&provider.user_agent)?,
            url: listing.wikipedia_sp500_url.clone(),
        })
    }

    /// 페이지 URL 변경
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl ListingProvider for WikipediaSp500Provider {
    fn name(&self) -> &str {
        "Wikipedia"
    }

    fn supported_markets(&self) -> Vec<ListingMarket> {
        vec![ListingMarket::Sp500]
    }

    async fn fetch_market(&self, market: ListingMarket) -> Result<Vec<SymbolMetadata>> {
        if market != ListingMarket::Sp500 {
            return Err(DataError::Listing(format!(
                "위키백과 Provider는 {} 목록을 제공하지 않습니다",
                market
            )));
        }

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Listing(format!("위키백과 응답 오류: HTTP {}", status)));
        }

        let html = response.text().await?;
        let symbols = parse_sp500_table(&html)?;
        info!(count = symbols.len(), "S&P 500 구성 종목 수집 완료");
        Ok(symbols)
    }
}

/// 첫 번째 표에서 S&P 500 구성 종목을 읽습니다.
pub fn parse_sp500_table(html: &str) -> Result<Vec<SymbolMetadata>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| DataError::Listing("S&P 500 표를 찾을 수 없습니다".to_string()))?;

    let headers: Vec<String> = table
        .select(&th_sel)
        .map(|th| cell_text(&th))
        .collect();
    let column = |name: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .unwrap_or(fallback)
    };
    let symbol_col = column("Symbol", 0);
    let name_col = column("Security", 1);
    let sector_col = column("GICS Sector", 2);
    let industry_col = column("GICS Sub-Industry", 3);

    let symbols = table
        .select(&row_sel)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&td_sel).map(|td| cell_text(&td)).collect();
            let ticker = cells.get(symbol_col)?.replace('.', "-");
            if ticker.is_empty() {
                return None;
            }
            let non_empty = |idx: usize| cells.get(idx).filter(|v| !v.is_empty()).cloned();

            Some(SymbolMetadata {
                ticker,
                name: non_empty(name_col).unwrap_or_default(),
                market: ListingMarket::Sp500,
                exchange: None,
                sector: non_empty(sector_col),
                sub_industry: non_empty(industry_col),
            })
        })
        .collect::<Vec<_>>();

    if symbols.is_empty() {
        return Err(DataError::Listing("S&P 500 표가 비어 있습니다".to_string()));
    }
    Ok(symbols)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::Parse(format!("selector {}: {:?}", css, e)))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
