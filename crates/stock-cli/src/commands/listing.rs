//! 상장 종목 목록 수집 명령어.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use stock_core::AppConfig;
use stock_data::{
    save_listing_csv, KrxListingProvider, ListingMarket, ListingProvider, NaverMarketSumScraper,
    SymbolMetadata, WikipediaSp500Provider,
};

use crate::ui::spinner;

/// 미리보기 행 수
const PREVIEW_ROWS: usize = 10;

/// 한국 시장 목록 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingSource {
    /// KRX 정보데이터시스템
    #[default]
    Krx,
    /// 네이버 금융 시가총액 페이지
    Naver,
}

impl FromStr for ListingSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "krx" => Ok(Self::Krx),
            "naver" | "네이버" => Ok(Self::Naver),
            _ => anyhow::bail!("지원하지 않는 출처: {}. 사용 가능: krx, naver", s),
        }
    }
}

/// 목록 명령 설정.
#[derive(Debug, Clone)]
pub struct ListingCommand {
    pub market: ListingMarket,
    pub source: ListingSource,
    pub output: Option<PathBuf>,
}

/// 목록 수집 후 CSV 저장. 저장한 종목 수를 반환합니다.
pub async fn run_listing(command: ListingCommand, config: &AppConfig) -> Result<usize> {
    let market = command.market;
    let started = Instant::now();

    println!("\n🔍 {} 종목 목록 수집 중...", market);

    let entries = match (market, command.source) {
        (ListingMarket::Sp500, _) => {
            let provider = WikipediaSp500Provider::from_config(&config.listing, &config.provider)?;
            provider.fetch_market(market).await
        }
        (_, ListingSource::Krx) => {
            let provider = KrxListingProvider::from_config(&config.listing, &config.provider)?;
            provider.fetch_market(market).await
        }
        (_, ListingSource::Naver) => {
            let scraper = NaverMarketSumScraper::from_config(&config.listing, &config.provider)?;
            let pb = spinner("네이버 금융 페이지 수집 중")?;
            let progress = pb.clone();
            let result = scraper
                .fetch_pages(market, move |page, count| {
                    progress.set_message(format!("{}페이지 수집 중 (누적 {}개)", page, count));
                })
                .await;
            pb.finish_and_clear();
            result
        }
    }
    .with_context(|| format!("{} 목록을 가져오지 못했습니다", market))?;

    let elapsed = started.elapsed();
    print_preview(&entries);
    println!("\n총 {}개 종목 ({:.1}초)", entries.len(), elapsed.as_secs_f64());

    let path = command
        .output
        .unwrap_or_else(|| PathBuf::from(market.default_file_name()));
    let saved = save_listing_csv(&path, market, &entries)
        .with_context(|| format!("CSV 저장 실패: {}", path.display()))?;
    println!("📁 저장 위치: {}", path.display());

    Ok(saved)
}

fn print_preview(entries: &[SymbolMetadata]) {
    println!("\n{:<10} {:<30} {}", "티커", "종목명", "업종");
    println!("{}", "-".repeat(60));
    for entry in entries.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<10} {:<30} {}",
            entry.ticker,
            entry.name,
            entry.sector.as_deref().unwrap_or("-")
        );
    }
    if entries.len() > PREVIEW_ROWS {
        println!("... 외 {}개", entries.len() - PREVIEW_ROWS);
    }
}
