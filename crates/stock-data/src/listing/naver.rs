//! 네이버 금융 시가총액 페이지 스크래퍼.
//!
//! `sise_market_sum.naver?sosok={0|1}&page={p}` 페이지의 종목 링크(`a.tltle`)에서
//! 종목명과 코드를 읽습니다. 마지막 페이지를 넘기면 네이버는 마지막 페이지를
//! 다시 보여주므로, 새 종목이 하나도 없는 페이지에서 수집을 멈춥니다.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use stock_core::{ListingConfig, ProviderConfig};
use tracing::{debug, info};

use super::{listing_client, ListingMarket, ListingProvider, SymbolMetadata};
use crate::{DataError, Result};

/// 네이버 시가총액 페이지 스크래퍼.
#[derive(Debug, Clone)]
pub struct NaverMarketSumScraper {
    client: Client,
    base_url: String,
    max_pages: u32,
    /// 페이지 요청 간 딜레이
    page_delay: Duration,
}

impl NaverMarketSumScraper {
    /// 기본 설정으로 생성
    pub fn new() -> Result<Self> {
        Self::from_config(&ListingConfig::default(), &ProviderConfig::default())
    }

    /// 설정에서 생성
    pub fn from_config(listing: &ListingConfig, provider: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: listing_client(&provider.user_agent)?,
            base_url: listing.naver_base_url.trim_end_matches('/').to_string(),
            max_pages: listing.naver_max_pages.max(1),
            page_delay: listing.naver_page_delay(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// 페이지를 넘기며 시장 전체 종목을 수집합니다.
    ///
    /// `on_page`에는 (페이지 번호, 지금까지 수집한 종목 수)가 전달됩니다.
    pub async fn fetch_pages<F>(
        &self,
        market: ListingMarket,
        mut on_page: F,
    ) -> Result<Vec<SymbolMetadata>>
    where
        F: FnMut(u32, usize) + Send,
    {
        let sosok = match market {
            ListingMarket::Kospi => "0",
            ListingMarket::Kosdaq => "1",
            ListingMarket::Sp500 => {
                return Err(DataError::Listing(format!(
                    "네이버 시가총액 페이지는 {} 목록을 제공하지 않습니다",
                    market
                )));
            }
        };

        let mut seen = HashSet::new();
        let mut symbols = Vec::new();

        for page in 1..=self.max_pages {
            let html = self.fetch_page(sosok, page).await?;
            let entries = parse_market_sum_page(&html, market);
            if entries.is_empty() {
                debug!(%market, page, "빈 페이지, 수집 종료");
                break;
            }

            let before = symbols.len();
            for entry in entries {
                if seen.insert(entry.ticker.clone()) {
                    symbols.push(entry);
                }
            }
            on_page(page, symbols.len());

            if symbols.len() == before {
                debug!(%market, page, "새 종목 없음, 수집 종료");
                break;
            }

            if page < self.max_pages && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        info!(%market, count = symbols.len(), "네이버 시가총액 목록 수집 완료");
        Ok(symbols)
    }

    async fn fetch_page(&self, sosok: &str, page: u32) -> Result<String> {
        let url = format!("{}/sise/sise_market_sum.naver", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("sosok", sosok.to_string()), ("page", page.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Listing(format!(
                "네이버 금융 응답 오류: HTTP {} (page {})",
                status, page
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ListingProvider for NaverMarketSumScraper {
    fn name(&self) -> &str {
        "Naver Finance"
    }

    fn supported_markets(&self) -> Vec<ListingMarket> {
        vec![ListingMarket::Kospi, ListingMarket::Kosdaq]
    }

    async fn fetch_market(&self, market: ListingMarket) -> Result<Vec<SymbolMetadata>> {
        self.fetch_pages(market, |_, _| {}).await
    }
}

/// 시가총액 페이지 한 장에서 종목 목록 추출.
pub fn parse_market_sum_page(html: &str, market: ListingMarket) -> Vec<SymbolMetadata> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a.tltle") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let code = href.split("code=").nth(1)?.split('&').next()?.trim();
            let name = link.text().collect::<String>();
            let name = name.trim();
            if code.is_empty() || name.is_empty() {
                return None;
            }
            Some(SymbolMetadata::korean(code, name, market))
        })
        .collect()
}
