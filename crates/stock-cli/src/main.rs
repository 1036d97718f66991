//! 주식 시세 다운로더 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 엑셀 티커 목록으로 최근 3년 일봉 다운로드
//! stockdl download --file tickers.xlsx --period 3y
//!
//! # 직접 입력, ZIP으로 압축
//! stockdl download --tickers "005930,삼성전자; AAPL,애플" --zip
//!
//! # 코스피 종목 목록 (네이버 금융)
//! stockdl listing kospi --source naver
//!
//! # 종목 조회 후 엑셀 저장
//! stockdl inspect 삼성전자 --market kr --export samsung.xlsx
//!
//! # 코스피, S&P 500 지수 CSV
//! stockdl indices --dir index --period 10y
//!
//! # 최근 거래일 확인
//! stockdl probe
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stock_analytics::Market;
use stock_cli::commands::download::{run_download, DownloadCommand};
use stock_cli::commands::indices::{run_indices, IndicesCommand};
use stock_cli::commands::inspect::{run_inspect, InspectCommand};
use stock_cli::commands::listing::{run_listing, ListingCommand, ListingSource};
use stock_cli::commands::probe::run_probe;
use stock_core::{init_logging, AppConfig, LogConfig, LogFormat, DEFAULT_CONFIG_PATH};
use stock_data::ListingMarket;
use tracing::{error, info};

/// 로그 필터에 포함할 크레이트
const LOG_TARGETS: [&str; 4] = ["stockdl", "stock_cli", "stock_collector", "stock_data"];

#[derive(Parser)]
#[command(name = "stockdl")]
#[command(about = "주식 시세 다운로더 - 한국/미국 종목 일봉 배치 다운로드", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml, 없으면 기본값)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 티커 목록 배치 다운로드 (종목별 엑셀 + 요약)
    Download {
        /// 티커 목록 파일 (xlsx, xls, csv)
        #[arg(short, long, conflicts_with = "tickers")]
        file: Option<PathBuf>,

        /// 직접 입력 (예: "005930,삼성전자; AAPL,애플")
        #[arg(short, long)]
        tickers: Option<String>,

        /// 조회 기간 (1y, 3y, 5y, 10y)
        #[arg(short, long, conflicts_with = "start")]
        period: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD, 기본: 오늘)
        #[arg(short, long)]
        end: Option<String>,

        /// 저장 폴더 (기본: 설정의 download.output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ZIP 하나로 압축 저장
        #[arg(long, default_value = "false")]
        zip: bool,

        /// 동시 워커 수 상한
        #[arg(short, long)]
        workers: Option<usize>,

        /// 종목명 입력을 KRX 목록으로 코드 변환
        #[arg(long, default_value = "false")]
        resolve_names: bool,
    },

    /// 상장 종목 목록 수집 후 CSV 저장
    Listing {
        /// 시장 (kospi, kosdaq, sp500)
        market: String,

        /// 한국 시장 출처 (krx, naver)
        #[arg(long, default_value = "krx")]
        source: String,

        /// 출력 파일 (기본: kospi_list.csv 등)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 종목 조회 (요약 지표, 크로스, 최근 10일)
    Inspect {
        /// 종목명 또는 티커 (예: 삼성전자, 005930, AAPL)
        query: String,

        /// 시장 (kr, us)
        #[arg(short, long, default_value = "kr")]
        market: String,

        /// 시작 날짜 (YYYY-MM-DD, 기본: 1년 전)
        #[arg(short, long)]
        start: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD, 기본: 오늘)
        #[arg(short, long)]
        end: Option<String>,

        /// 조회 결과 엑셀 저장 경로
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// 코스피, S&P 500 지수 CSV 저장
    Indices {
        /// 저장 폴더
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// 조회 기간 (1y, 3y, 5y, 10y)
        #[arg(short, long, default_value = "10y")]
        period: String,
    },

    /// 최근 코스피 거래일 확인
    Probe {
        /// 최대 탐색 일수
        #[arg(long, default_value = "10")]
        lookback: u32,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path, true)
            .with_context(|| format!("설정 파일을 읽을 수 없습니다: {}", path.display())),
        None => AppConfig::load(DEFAULT_CONFIG_PATH, false).context("설정을 읽을 수 없습니다"),
    }
}

fn log_config(cli: &Cli, config: &AppConfig) -> LogConfig {
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(&config.logging.format)
        .parse()
        .unwrap_or(LogFormat::Compact);

    LogConfig::new(LogConfig::crate_level_filter(&LOG_TARGETS, level)).with_format(format)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    init_logging(log_config(&cli, &config))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let result = match cli.command {
        Commands::Download {
            file,
            tickers,
            period,
            start,
            end,
            output,
            zip,
            workers,
            resolve_names,
        } => {
            let command = DownloadCommand {
                file,
                tickers,
                period,
                start,
                end,
                output,
                zip,
                workers,
                resolve_names,
            };
            run_download(command, &config).await.map(|report| {
                info!(
                    success = report.summary.success,
                    failed = report.summary.failed,
                    "download 명령 완료"
                );
            })
        }

        Commands::Listing {
            market,
            source,
            output,
        } => {
            let command = ListingCommand {
                market: market.parse::<ListingMarket>()?,
                source: source.parse::<ListingSource>()?,
                output,
            };
            run_listing(command, &config).await.map(|count| {
                info!(count, "listing 명령 완료");
            })
        }

        Commands::Inspect {
            query,
            market,
            start,
            end,
            export,
        } => {
            let command = InspectCommand {
                query,
                market: market.parse::<Market>()?,
                start,
                end,
                export,
            };
            run_inspect(command, &config).await.map(|_| ())
        }

        Commands::Indices { dir, period } => run_indices(IndicesCommand { dir, period }, &config)
            .await
            .map(|saved| {
                info!(files = saved.len(), "indices 명령 완료");
            }),

        Commands::Probe { lookback } => run_probe(lookback, &config).await.map(|_| ()),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_args() {
        let cli = Cli::try_parse_from([
            "stockdl",
            "download",
            "--tickers",
            "005930,삼성전자; AAPL,애플",
            "--period",
            "3y",
            "--zip",
            "--workers",
            "8",
        ])
        .unwrap();

        match cli.command {
            Commands::Download {
                tickers,
                period,
                zip,
                workers,
                file,
                ..
            } => {
                assert_eq!(tickers.as_deref(), Some("005930,삼성전자; AAPL,애플"));
                assert_eq!(period.as_deref(), Some("3y"));
                assert!(zip);
                assert_eq!(workers, Some(8));
                assert!(file.is_none());
            }
            _ => panic!("download 명령이어야 합니다"),
        }
    }

    #[test]
    fn test_conflicting_sources_rejected() {
        let parsed = Cli::try_parse_from([
            "stockdl",
            "download",
            "--file",
            "tickers.xlsx",
            "--tickers",
            "AAPL",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_log_options() {
        let cli = Cli::try_parse_from([
            "stockdl",
            "probe",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = log_config(&cli, &AppConfig::default());
        assert_eq!(
            config.level,
            "stockdl=debug,stock_cli=debug,stock_collector=debug,stock_data=debug"
        );
        assert_eq!(config.format, LogFormat::Json);
        assert!(matches!(cli.command, Commands::Probe { lookback: 10 }));
    }
}
