//! 다운로더 도메인 타입.
//!
//! 티커 요청에서 시작해 종목별 결과로 끝나는 한 번의 배치 실행에서
//! 주고받는 값들을 정의합니다. 모든 타입은 생성 후 변경되지 않습니다.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// 다운로드할 종목 하나.
///
/// `symbol`은 거래소 코드(005930, AAPL), 종목명(삼성전자) 또는
/// 지수 별칭(코스피)일 수 있으며, 실제 코드로의 변환은 리졸버가 담당합니다.
/// 중복 요청은 걸러내지 않고 각각 처리합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRequest {
    /// 입력된 티커 (또는 종목명/별칭)
    pub symbol: String,
    /// 표시용 종목명
    pub display_name: String,
}

impl TickerRequest {
    /// 앞뒤 공백을 제거한 요청을 생성합니다.
    pub fn new(symbol: impl AsRef<str>, display_name: impl AsRef<str>) -> Self {
        Self {
            symbol: symbol.as_ref().trim().to_string(),
            display_name: display_name.as_ref().trim().to_string(),
        }
    }
}

/// 조회 기간 프리셋.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodPreset {
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
}

impl PeriodPreset {
    /// 프리셋의 연 단위 길이.
    pub fn years(&self) -> i64 {
        match self {
            Self::OneYear => 1,
            Self::ThreeYears => 3,
            Self::FiveYears => 5,
            Self::TenYears => 10,
        }
    }

    /// 기준일로부터 365일 × N 이전의 시작일.
    pub fn start_from(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(365 * self.years())
    }
}

impl FromStr for PeriodPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1y" | "1" | "1년" | "1year" => Ok(Self::OneYear),
            "3y" | "3" | "3년" | "3years" => Ok(Self::ThreeYears),
            "5y" | "5" | "5년" | "5years" => Ok(Self::FiveYears),
            "10y" | "10" | "10년" | "10years" => Ok(Self::TenYears),
            _ => Err(CoreError::InvalidInput(format!(
                "지원하지 않는 기간: {}. 사용 가능: 1y, 3y, 5y, 10y",
                s
            ))),
        }
    }
}

/// 조회 기간 (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 시작일이 종료일보다 늦으면 에러를 반환합니다.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidInput(format!(
                "시작일({})이 종료일({})보다 늦습니다",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// 프리셋 기간으로 `today`까지의 범위를 만듭니다.
    pub fn preset(preset: PeriodPreset, today: NaiveDate) -> Self {
        Self {
            start: preset.start_from(today),
            end: today,
        }
    }

    /// 하루짜리 범위.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// 기간 일수 (양 끝 포함).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.start, self.end)
    }
}

/// 날짜 문자열 파싱 (YYYY-MM-DD)
pub fn parse_date(s: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        CoreError::InvalidInput(format!(
            "날짜 형식이 올바르지 않습니다: {}. YYYY-MM-DD 형식을 사용하세요",
            s
        ))
    })
}

/// 일봉 한 개.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// 날짜 오름차순으로 정렬된 가격 시계열.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 데이터 공급처에서 실제로 조회한 심볼
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 날짜순으로 정렬한 시계열을 생성합니다.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 거래량 목록.
    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// 가장 최근 봉.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

/// 종목별 다운로드 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchStatus {
    Success,
    Failed,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// 요청 하나에 대한 최종 결과.
///
/// 요청마다 정확히 하나씩 생성되며, 실패한 종목도 사람이 읽을 수 있는
/// 메시지와 함께 요약에 남습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// 요청에 입력된 티커
    pub ticker: String,
    pub display_name: String,
    pub status: FetchStatus,
    pub message: String,
    #[serde(skip)]
    pub series: Option<PriceSeries>,
}

impl FetchResult {
    /// 성공 결과. 메시지는 "{행 수}건 완료".
    pub fn success(request: &TickerRequest, series: PriceSeries) -> Self {
        Self {
            ticker: request.symbol.clone(),
            display_name: request.display_name.clone(),
            status: FetchStatus::Success,
            message: format!("{}건 완료", series.len()),
            series: Some(series),
        }
    }

    /// 실패 결과.
    pub fn failed(request: &TickerRequest, message: impl Into<String>) -> Self {
        Self {
            ticker: request.symbol.clone(),
            display_name: request.display_name.clone(),
            status: FetchStatus::Failed,
            message: message.into(),
            series: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}
