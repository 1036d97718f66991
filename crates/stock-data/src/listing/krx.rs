//! KRX 정보데이터시스템 종목 목록.
//!
//! `MDCSTAT01501` (전종목 시세) 화면의 JSON 응답에서 종목코드와 종목명을 읽습니다.
//! `trdDd`를 지정하면 해당 거래일 기준 목록을 돌려주며, 휴장일에는 빈 목록이 옵니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use stock_core::{ListingConfig, ProviderConfig};
use tracing::debug;

use super::{listing_client, ListingMarket, ListingProvider, SymbolMetadata};
use crate::{DataError, Result};

const KRX_JSON_PATH: &str = "/comm/bldAttendant/getJsonData.cmd";
const KRX_REFERER_PATH: &str = "/contents/MDC/MDI/mdiLoader/index.cmd?menuId=MDC0201";

#[derive(Debug, Deserialize)]
struct KrxResponse {
    #[serde(rename = "OutBlock_1")]
    out_block: Option<Vec<KrxStock>>,
}

#[derive(Debug, Deserialize)]
struct KrxStock {
    #[serde(rename = "ISU_SRT_CD")]
    ticker: String,
    #[serde(rename = "ISU_ABBRV")]
    name: String,
    #[serde(rename = "SECT_TP_NM", default)]
    sector: Option<String>,
}

/// KRX 종목 목록 Provider.
#[derive(Debug, Clone)]
pub struct KrxListingProvider {
    client: Client,
    base_url: String,
}

impl KrxListingProvider {
    /// 기본 설정으로 생성
    pub fn new() -> Result<Self> {
        Self::from_config(&ListingConfig::default(), &ProviderConfig::default())
    }

    /// 설정에서 생성
    pub fn from_config(listing: &ListingConfig, provider: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: listing_client(&provider.user_agent)?,
            base_url: listing.krx_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 기본 URL 변경
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// 특정 거래일 기준 종목 목록 조회.
    ///
    /// 휴장일이면 빈 목록을 반환합니다.
    pub async fn fetch_market_on(
        &self,
        market: ListingMarket,
        date: NaiveDate,
    ) -> Result<Vec<SymbolMetadata>> {
        self.request(market, Some(date)).await
    }

    async fn request(
        &self,
        market: ListingMarket,
        date: Option<NaiveDate>,
    ) -> Result<Vec<SymbolMetadata>> {
        let market_code = match market {
            ListingMarket::Kospi => "STK",
            ListingMarket::Kosdaq => "KSQ",
            ListingMarket::Sp500 => {
                return Err(DataError::Listing(format!(
                    "KRX는 {} 목록을 제공하지 않습니다",
                    market
                )));
            }
        };

        let mut params = vec![
            ("bld", "dbms/MDC/STAT/standard/MDCSTAT01501".to_string()),
            ("mktId", market_code.to_string()),
            ("share", "1".to_string()),
            ("csvxls_isNo", "false".to_string()),
        ];
        if let Some(date) = date {
            params.push(("trdDd", date.format("%Y%m%d").to_string()));
        }

        debug!(%market, ?date, "KRX 종목 목록 요청");

        let response = self
            .client
            .post(format!("{}{}", self.base_url, KRX_JSON_PATH))
            .header("Referer", format!("{}{}", self.base_url, KRX_REFERER_PATH))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Listing(format!("KRX 응답 오류: HTTP {}", status)));
        }

        let body = response.text().await?;
        let data: KrxResponse = serde_json::from_str(&body)?;

        let symbols = data
            .out_block
            .unwrap_or_default()
            .into_iter()
            .filter(|s| !s.ticker.trim().is_empty())
            .map(|s| {
                let mut meta = SymbolMetadata::korean(s.ticker.trim(), s.name.trim(), market);
                meta.sector = s.sector.filter(|v| !v.trim().is_empty());
                meta
            })
            .collect::<Vec<_>>();

        debug!(%market, count = symbols.len(), "KRX 종목 목록 수신");
        Ok(symbols)
    }
}

#[async_trait]
impl ListingProvider for KrxListingProvider {
    fn name(&self) -> &str {
        "KRX"
    }

    fn supported_markets(&self) -> Vec<ListingMarket> {
        vec![ListingMarket::Kospi, ListingMarket::Kosdaq]
    }

    async fn fetch_market(&self, market: ListingMarket) -> Result<Vec<SymbolMetadata>> {
        self.request(market, None).await
    }
}
