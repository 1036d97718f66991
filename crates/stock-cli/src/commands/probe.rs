//! 최근 거래일 확인 명령어.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use stock_core::AppConfig;
use stock_data::{recent_business_day, KrxListingProvider, ListingMarket};

/// 출력할 종목 수
const SAMPLE_SIZE: usize = 5;

/// 오늘부터 거슬러 올라가며 코스피 목록이 비어 있지 않은 첫 날짜를 찾습니다.
pub async fn run_probe(lookback: u32, config: &AppConfig) -> Result<Option<NaiveDate>> {
    let krx = KrxListingProvider::from_config(&config.listing, &config.provider)
        .context("KRX 클라이언트를 만들 수 없습니다")?;
    let today = chrono::Local::now().date_naive();

    println!("\n🔍 최근 거래일 탐색 (기준일 {}, 최대 {}일)", today, lookback);

    let found = recent_business_day(today, lookback, |date| {
        krx.fetch_market_on(ListingMarket::Kospi, date)
    })
    .await;

    match found {
        Some((date, entries)) => {
            println!("✅ 최근 거래일: {}", date);
            println!("   코스피 종목 수: {}개", entries.len());
            for entry in entries.iter().take(SAMPLE_SIZE) {
                println!("   {}: {}", entry.ticker, entry.name);
            }
            Ok(Some(date))
        }
        None => {
            println!("⚠️  최근 {}일 안에서 거래일을 찾지 못했습니다", lookback);
            Ok(None)
        }
    }
}
