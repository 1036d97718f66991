//! 설정 관리.
//!
//! 기본값 → TOML 파일 → `STOCKDL__` 환경 변수 순서로 덮어씁니다.
//! 모든 키는 선택 사항이며, 빠진 값은 기본값으로 채워집니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 배치 다운로드 설정
    pub download: DownloadConfig,
    /// 시세 데이터 공급처 설정
    pub provider: ProviderConfig,
    /// 상장 종목 목록 설정
    pub listing: ListingConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 배치 다운로드 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// 워커 수 상한 (실제 수는 CPU 수 + 4와 비교해 작은 값)
    pub max_workers: usize,
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 재시도 전 대기 시간 (밀리초)
    pub retry_delay_ms: u64,
    /// 종목별 파일을 저장할 폴더
    pub output_dir: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_workers: 32,
            max_attempts: 2,
            retry_delay_ms: 1000,
            output_dir: "stock_price".to_string(),
        }
    }
}

impl DownloadConfig {
    /// 재시도 대기 시간을 Duration으로 반환
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// 시세 데이터 공급처 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Yahoo Finance API 기본 URL
    pub yahoo_base_url: String,
    /// HTTP User-Agent
    pub user_agent: String,
    /// 요청 타임아웃 (초, 0이면 제한 없음)
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: default_user_agent(),
            request_timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// 요청 타임아웃. 0이면 `None`.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// 상장 종목 목록 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingConfig {
    /// KRX 정보데이터시스템 기본 URL
    pub krx_base_url: String,
    /// 네이버 금융 기본 URL
    pub naver_base_url: String,
    /// 네이버 시가총액 페이지 최대 수집 페이지 수
    pub naver_max_pages: u32,
    /// 네이버 페이지 요청 간 딜레이 (밀리초)
    pub naver_page_delay_ms: u64,
    /// S&P 500 구성 종목 위키백과 URL
    pub wikipedia_sp500_url: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            krx_base_url: "http://data.krx.co.kr".to_string(),
            naver_base_url: "https://finance.naver.com".to_string(),
            naver_max_pages: 50,
            naver_page_delay_ms: 100,
            wikipedia_sp500_url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies"
                .to_string(),
        }
    }
}

impl ListingConfig {
    /// 네이버 페이지 요청 간 딜레이를 Duration으로 반환
    pub fn naver_page_delay(&self) -> Duration {
        Duration::from_millis(self.naver_page_delay_ms)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `required`가 `false`이면 파일이 없어도 기본값과 환경 변수만으로 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(required))
            .add_source(
                config::Environment::with_prefix("STOCKDL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로(`config/default.toml`, 없어도 됨)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.download.max_workers, 32);
        assert_eq!(config.download.max_attempts, 2);
        assert_eq!(config.download.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.download.output_dir, "stock_price");
        assert_eq!(config.listing.naver_max_pages, 50);
        assert_eq!(config.provider.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let provider = ProviderConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(provider.request_timeout(), None);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockdl.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[download]\nmax_workers = 8\noutput_dir = \"out\"").unwrap();
        writeln!(file, "[listing]\nnaver_max_pages = 3").unwrap();

        let config = AppConfig::load(&path, true).unwrap();
        assert_eq!(config.download.max_workers, 8);
        assert_eq!(config.download.output_dir, "out");
        // 파일에 없는 값은 기본값 유지
        assert_eq!(config.download.max_attempts, 2);
        assert_eq!(config.listing.naver_max_pages, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("missing.toml"), false).unwrap();
        assert_eq!(config.download.max_workers, 32);

        assert!(AppConfig::load(dir.path().join("missing.toml"), true).is_err());
    }
}
