//! 지수 시세 CSV 저장 명령어.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stock_collector::write_series_csv;
use stock_core::{AppConfig, DateRange, PeriodPreset};
use stock_data::{HistoricalProvider, YahooChartProvider};
use tracing::{info, warn};

/// (조회 심볼, 파일명, 표시 이름)
pub const INDEX_TARGETS: [(&str, &str, &str); 2] = [
    ("^KS11", "kospi_index.csv", "코스피"),
    ("US500", "sp500_index.csv", "S&P 500"),
];

/// 지수 명령 설정.
#[derive(Debug, Clone)]
pub struct IndicesCommand {
    pub dir: PathBuf,
    pub period: String,
}

/// 코스피, S&P 500 지수를 CSV로 저장하고 저장한 파일 목록을 반환합니다.
///
/// 한 지수가 실패해도 나머지는 계속 저장합니다.
pub async fn run_indices(command: IndicesCommand, config: &AppConfig) -> Result<Vec<PathBuf>> {
    let preset: PeriodPreset = command.period.parse()?;
    let range = DateRange::preset(preset, chrono::Local::now().date_naive());
    let provider = YahooChartProvider::from_config(&config.provider)
        .context("HTTP 클라이언트를 만들 수 없습니다")?;

    println!("\n📊 지수 데이터 저장 ({})", range);

    let mut saved = Vec::new();
    for (symbol, file_name, label) in INDEX_TARGETS {
        let path = command.dir.join(file_name);
        match save_index(&provider, symbol, &range, &path).await {
            Ok(rows) => {
                info!(symbol, rows, path = %path.display(), "지수 저장");
                println!("✅ {}: {}건 → {}", label, rows, path.display());
                saved.push(path);
            }
            Err(e) => {
                warn!(symbol, error = %e, "지수 저장 실패");
                println!("✗ {}: {:#}", label, e);
            }
        }
    }

    if saved.is_empty() {
        anyhow::bail!("저장된 지수 데이터가 없습니다");
    }
    Ok(saved)
}

async fn save_index(
    provider: &YahooChartProvider,
    symbol: &str,
    range: &DateRange,
    path: &Path,
) -> Result<usize> {
    let series = provider.fetch(symbol, range).await?;
    if series.is_empty() {
        anyhow::bail!("'{}' 데이터를 찾을 수 없습니다 (No Data)", symbol);
    }
    Ok(write_series_csv(path, &series)?)
}
