//! Yahoo Finance v8 chart API Provider.
//!
//! 한국 주식, 미국 주식, 지수, 환율, 암호화폐 일봉을 한 API로 조회합니다.
//!
//! ## 심볼 변환
//! - `005930` → `005930.KS`, 없으면 `005930.KQ`
//! - `US500` → `^GSPC`, `IXIC` → `^IXIC`, `DJI` → `^DJI`
//! - `USD/KRW` → `KRW=X`, `BTC/KRW` → `BTC-KRW`
//! - `^KS11` 같은 Yahoo 지수 심볼은 그대로 사용

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use stock_core::{DateRange, PriceBar, PriceSeries, ProviderConfig};
use tracing::{debug, info};

use super::HistoricalProvider;
use crate::{DataError, Result};

/// 가상화폐로 취급하는 기준 통화 (`BTC/KRW` → `BTC-KRW`)
const CRYPTO_BASES: &[&str] = &["BTC", "ETH", "XRP", "SOL", "DOGE", "ADA"];

/// Yahoo Finance API v8 응답 구조
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    /// 거래소 현지 시간과 UTC의 차이 (초)
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

/// Yahoo Finance 차트 API Provider.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// 기본 설정으로 생성
    pub fn new() -> Result<Self> {
        Self::from_config(&ProviderConfig::default())
    }

    /// 설정에서 생성 (User-Agent, 타임아웃, 기본 URL)
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 기본 URL 변경 (테스트용 목 서버 등)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Yahoo 심볼 하나에 대한 일봉 조회.
    async fn fetch_chart(&self, yahoo_symbol: &str, range: &DateRange) -> Result<Vec<PriceBar>> {
        let (period1, period2) = period_bounds(range);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, yahoo_symbol);

        debug!(symbol = yahoo_symbol, %range, "Yahoo Finance 차트 조회");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(symbol = yahoo_symbol, status = %status, bytes = body.len(), "Yahoo Finance 응답");

        let chart_response: YahooChartResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(DataError::Parse(format!("{}: {}", yahoo_symbol, e)));
            }
            Err(_) => {
                return Err(DataError::Provider {
                    symbol: yahoo_symbol.to_string(),
                    message: format!("HTTP {} - {}", status, truncate(&body, 200)),
                });
            }
        };

        if let Some(error) = chart_response.chart.error {
            if error.code.eq_ignore_ascii_case("Not Found") {
                return Err(DataError::NoData {
                    symbol: yahoo_symbol.to_string(),
                });
            }
            return Err(DataError::Provider {
                symbol: yahoo_symbol.to_string(),
                message: format!(
                    "{} - {}",
                    error.code,
                    error.description.unwrap_or_default()
                ),
            });
        }

        if !status.is_success() {
            return Err(DataError::Provider {
                symbol: yahoo_symbol.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let result = chart_response
            .chart
            .result
            .and_then(|r| r.into_iter().next());

        Ok(result.map(parse_bars).unwrap_or_default())
    }
}

#[async_trait]
impl HistoricalProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries> {
        let candidates = yahoo_candidates(symbol);
        let mut saw_empty = false;

        for candidate in &candidates {
            match self.fetch_chart(candidate, range).await {
                Ok(bars) if !bars.is_empty() => {
                    info!(symbol = %symbol, source_symbol = %candidate, rows = bars.len(), "시세 조회 성공");
                    return Ok(PriceSeries::new(candidate.clone(), bars));
                }
                Ok(_) => {
                    debug!(source_symbol = %candidate, "빈 응답, 다음 후보 시도");
                    saw_empty = true;
                }
                Err(DataError::NoData { .. }) => {
                    debug!(source_symbol = %candidate, "심볼 없음, 다음 후보 시도");
                }
                Err(e) => return Err(e),
            }
        }

        if saw_empty {
            let first = candidates.first().cloned().unwrap_or_else(|| symbol.to_string());
            Ok(PriceSeries::empty(first))
        } else {
            Err(DataError::NoData {
                symbol: symbol.to_string(),
            })
        }
    }
}

/// 입력 심볼을 Yahoo 심볼 후보 목록으로 변환합니다 (앞에서부터 시도).
pub fn yahoo_candidates(symbol: &str) -> Vec<String> {
    let symbol = symbol.trim();

    if is_korean_stock_code(symbol) {
        return vec![format!("{}.KS", symbol), format!("{}.KQ", symbol)];
    }

    let upper = symbol.to_uppercase();
    let mapped = match upper.as_str() {
        "US500" | "SPX" => Some("^GSPC".to_string()),
        "IXIC" => Some("^IXIC".to_string()),
        "DJI" => Some("^DJI".to_string()),
        "KS11" => Some("^KS11".to_string()),
        "KQ11" => Some("^KQ11".to_string()),
        "KS200" => Some("^KS200".to_string()),
        "USD/KRW" => Some("KRW=X".to_string()),
        _ => None,
    };
    if let Some(mapped) = mapped {
        return vec![mapped];
    }

    if let Some((base, quote)) = upper.split_once('/') {
        if CRYPTO_BASES.contains(&base) {
            return vec![format!("{}-{}", base, quote)];
        }
        return vec![format!("{}{}=X", base, quote)];
    }

    vec![upper]
}

/// 6자리 숫자 종목 코드인지 확인
fn is_korean_stock_code(symbol: &str) -> bool {
    symbol.len() == 6 && symbol.chars().all(|c| c.is_ascii_digit())
}

/// 조회 기간을 UNIX 타임스탬프 구간으로 변환 (종료일 23:59:59 포함)
fn period_bounds(range: &DateRange) -> (i64, i64) {
    let start = Utc
        .from_utc_datetime(&range.start.and_time(chrono::NaiveTime::MIN))
        .timestamp();
    let end = Utc
        .from_utc_datetime(&range.end.and_time(chrono::NaiveTime::MIN))
        .timestamp()
        + 86_399;
    (start, end)
}

/// 응답 결과를 일봉으로 변환합니다. OHLC 중 하나라도 비어 있는 행은 건너뜁니다.
fn parse_bars(result: YahooResult) -> Vec<PriceBar> {
    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, ts) in timestamps.iter().enumerate() {
        let field = |values: &Vec<Option<f64>>| values.get(i).copied().flatten().and_then(to_decimal);

        let (Some(open), Some(high), Some(low), Some(close)) =
            (field(&opens), field(&highs), field(&lows), field(&closes))
        else {
            continue;
        };
        // 지수/환율은 거래량이 비어 있는 경우가 있어 0으로 둔다
        let volume = volumes.get(i).copied().flatten().unwrap_or(0).max(0) as u64;

        let Some(date) = local_date(*ts, offset) else {
            continue;
        };

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

fn local_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(4))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
