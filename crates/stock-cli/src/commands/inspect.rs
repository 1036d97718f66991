//! 종목 조회 명령어.
//!
//! 종목명 또는 티커로 일봉을 받아 현재가, 기간 고저, 거래량, RVOL,
//! 골든/데드 크로스와 최근 10일 표를 출력합니다.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use stock_analytics::{format_price, format_volume, DashboardSummary, Market};
use stock_collector::save_dashboard_workbook;
use stock_core::{parse_date, AppConfig, DateRange};
use stock_data::resolver::lookup_alias;
use stock_data::{
    HistoricalProvider, KrxListingProvider, ListingMarket, ListingProvider, NameIndex,
    WikipediaSp500Provider, YahooChartProvider,
};
use tracing::debug;

/// 최근 표 행 수
const RECENT_ROWS: usize = 10;

/// 조회 명령 설정.
#[derive(Debug, Clone)]
pub struct InspectCommand {
    /// 종목명 또는 티커
    pub query: String,
    pub market: Market,
    pub start: Option<String>,
    pub end: Option<String>,
    /// 조회 결과 엑셀 저장 경로
    pub export: Option<PathBuf>,
}

/// 목록 조회 없이 바로 쓸 수 있는 입력인지 확인합니다.
///
/// - 지수/환율 별칭
/// - 한국: 6자리 숫자 코드
/// - 미국: 대문자, 숫자, `-.^=` 만으로 된 티커
pub fn is_direct_symbol(query: &str, market: Market) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    if lookup_alias(query).is_some() {
        return true;
    }
    match market {
        Market::Kr => query.len() == 6 && query.chars().all(|c| c.is_ascii_digit()),
        Market::Us => query
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || "-.^=".contains(c)),
    }
}

/// 기본 조회 기간: 오늘 기준 최근 1년.
fn inspect_range(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Result<DateRange> {
    let end = end.map(parse_date).transpose()?.unwrap_or(today);
    let start = start
        .map(parse_date)
        .transpose()?
        .unwrap_or(end - Duration::days(365));
    Ok(DateRange::new(start, end)?)
}

/// 입력을 (조회 심볼, 표시 이름)으로 바꿉니다.
async fn resolve_query(query: &str, market: Market, config: &AppConfig) -> Result<(String, String)> {
    let query = query.trim();
    if let Some(alias) = lookup_alias(query) {
        return Ok((alias.to_string(), query.to_string()));
    }
    if is_direct_symbol(query, market) {
        return Ok((query.to_string(), query.to_string()));
    }

    debug!(query, %market, "종목 목록에서 검색");
    let found = match market {
        Market::Kr => {
            let krx = KrxListingProvider::from_config(&config.listing, &config.provider)?;
            let entries = krx.fetch_all().await.context("KRX 종목 목록을 가져오지 못했습니다")?;
            NameIndex::new(entries).lookup_kr(query)
        }
        Market::Us => {
            let wiki = WikipediaSp500Provider::from_config(&config.listing, &config.provider)?;
            let entries = wiki
                .fetch_market(ListingMarket::Sp500)
                .await
                .context("S&P 500 목록을 가져오지 못했습니다")?;
            NameIndex::new(entries).lookup_us(query)
        }
    };

    found.ok_or_else(|| anyhow::anyhow!("'{}' 종목을 찾을 수 없습니다", query))
}

/// 종목 조회 실행.
pub async fn run_inspect(command: InspectCommand, config: &AppConfig) -> Result<DashboardSummary> {
    let today = chrono::Local::now().date_naive();
    let range = inspect_range(command.start.as_deref(), command.end.as_deref(), today)?;
    let market = command.market;

    let (symbol, name) = resolve_query(&command.query, market, config).await?;

    let provider = YahooChartProvider::from_config(&config.provider)
        .context("HTTP 클라이언트를 만들 수 없습니다")?;
    let series = provider
        .fetch(&symbol, &range)
        .await
        .with_context(|| format!("{} 시세 조회 실패", symbol))?;
    if series.is_empty() {
        anyhow::bail!("'{}' 데이터를 찾을 수 없습니다 (No Data)", symbol);
    }

    let summary = DashboardSummary::compute(&series, market)?;
    print_summary(&name, &symbol, &range, &summary);

    if let Some(path) = &command.export {
        save_dashboard_workbook(path, &summary)
            .with_context(|| format!("엑셀 저장 실패: {}", path.display()))?;
        println!("\n📁 엑셀 저장: {}", path.display());
    }

    Ok(summary)
}

fn format_dates(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        "없음".to_string()
    } else {
        dates
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn format_change(change: Option<Decimal>) -> String {
    match change {
        Some(change) => format!("{:+.2}%", change * Decimal::ONE_HUNDRED),
        None => "-".to_string(),
    }
}

fn format_optional_price(value: Option<Decimal>, market: Market) -> String {
    value
        .map(|v| format_price(v, market))
        .unwrap_or_else(|| "-".to_string())
}

fn print_summary(name: &str, symbol: &str, range: &DateRange, summary: &DashboardSummary) {
    let market = summary.market;

    println!("\n{}", "=".repeat(72));
    println!("📈 {} ({}) | {} | {}", name, symbol, market, range);
    println!("{}", "=".repeat(72));
    println!("현재가:          {}", format_price(summary.current, market));
    println!("기간 최고가:     {}", format_price(summary.high, market));
    println!("기간 최저가:     {}", format_price(summary.low, market));
    println!("오늘 거래량:     {}", format_volume(summary.volume_today));
    println!("20일 평균 거래량: {}", format_volume(summary.volume_avg_20));
    println!("RVOL:            {:.2}", summary.rvol);
    println!("골든크로스:      {}", format_dates(&summary.golden_crosses));
    println!("데드크로스:      {}", format_dates(&summary.dead_crosses));

    println!(
        "\n{:<12} {:>16} {:>9} {:>18} {:>16} {:>16}",
        "날짜", "종가", "변동률", "거래량", "MA20", "MA60"
    );
    println!("{}", "-".repeat(92));
    for row in summary.recent(RECENT_ROWS) {
        println!(
            "{:<12} {:>16} {:>9} {:>18} {:>16} {:>16}",
            row.date.to_string(),
            format_price(row.close, market),
            format_change(row.change),
            format_volume(row.volume),
            format_optional_price(row.ma20, market),
            format_optional_price(row.ma60, market),
        );
    }
}
