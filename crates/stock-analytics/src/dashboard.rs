//! 종목 조회 요약 지표.
//!
//! 한 종목의 기간 시세에서 현재가, 기간 최고/최저가, 거래량 지표,
//! 이동평균(5/10/20/60일)과 20일선/60일선 교차 시점을 계산합니다.
//! 표시 방식(터미널, 엑셀)은 호출하는 쪽이 정합니다.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stock_core::{CoreError, PriceSeries};
use tracing::debug;

use crate::indicators::{
    average_volume, cross_signals, pct_change, rvol, sma, CrossKind, IndicatorError,
    IndicatorResult,
};

/// 이동평균 기간.
pub const MA_PERIODS: [usize; 4] = [5, 10, 20, 60];
/// 평균 거래량 기간.
pub const VOLUME_WINDOW: usize = 20;

/// 가격 표기 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    /// 한국 (원, 소수점 없음)
    Kr,
    /// 미국 ($, 소수점 2자리)
    Us,
}

impl Market {
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Kr => "원",
            Self::Us => "$",
        }
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Self::Kr => 0,
            Self::Us => 2,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kr => write!(f, "한국"),
            Self::Us => write!(f, "미국"),
        }
    }
}

impl FromStr for Market {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kr" | "korea" | "한국" => Ok(Self::Kr),
            "us" | "usa" | "미국" => Ok(Self::Us),
            _ => Err(CoreError::InvalidInput(format!(
                "지원하지 않는 시장: {}. 사용 가능: kr, us",
                s
            ))),
        }
    }
}

/// 일자별 행 (시세 + 이동평균 + 변동률).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
    /// 전일 대비 변동률 (0.01 = 1%)
    pub change: Option<Decimal>,
    pub ma5: Option<Decimal>,
    pub ma10: Option<Decimal>,
    pub ma20: Option<Decimal>,
    pub ma60: Option<Decimal>,
}

/// 종목 요약 지표.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub symbol: String,
    pub market: Market,
    /// 현재가 (마지막 종가)
    pub current: Decimal,
    /// 기간 최고가 (고가 기준)
    pub high: Decimal,
    /// 기간 최저가 (저가 기준)
    pub low: Decimal,
    /// 당일 거래량
    pub volume_today: u64,
    /// 최근 20일 평균 거래량
    pub volume_avg_20: u64,
    /// 상대거래량
    pub rvol: Decimal,
    /// 20일선이 60일선을 상향 돌파한 날짜
    pub golden_crosses: Vec<NaiveDate>,
    /// 20일선이 60일선을 하향 돌파한 날짜
    pub dead_crosses: Vec<NaiveDate>,
    /// 전체 행 (날짜 오름차순)
    pub rows: Vec<DashboardRow>,
}

impl DashboardSummary {
    /// 시계열에서 요약 지표를 계산합니다. 빈 시계열은 에러.
    pub fn compute(series: &PriceSeries, market: Market) -> IndicatorResult<Self> {
        let last = series.last().ok_or(IndicatorError::InsufficientData {
            required: 1,
            provided: 0,
        })?;

        let closes = series.closes();
        let volumes = series.volumes();

        let [ma5, ma10, ma20, ma60] = MA_PERIODS.map(|period| moving_average(&closes, period));
        let changes = pct_change(&closes);

        let mut golden_crosses = Vec::new();
        let mut dead_crosses = Vec::new();
        for signal in cross_signals(&ma20, &ma60) {
            let date = series.bars[signal.index].date;
            match signal.kind {
                CrossKind::Golden => golden_crosses.push(date),
                CrossKind::Dead => dead_crosses.push(date),
            }
        }

        let rows = series
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| DashboardRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                change: changes[i],
                ma5: ma5[i],
                ma10: ma10[i],
                ma20: ma20[i],
                ma60: ma60[i],
            })
            .collect::<Vec<_>>();

        let high = series
            .bars
            .iter()
            .map(|b| b.high)
            .max()
            .unwrap_or(last.high);
        let low = series.bars.iter().map(|b| b.low).min().unwrap_or(last.low);

        debug!(
            symbol = %series.symbol,
            rows = rows.len(),
            golden = golden_crosses.len(),
            dead = dead_crosses.len(),
            "요약 지표 계산"
        );

        Ok(Self {
            symbol: series.symbol.clone(),
            market,
            current: last.close,
            high,
            low,
            volume_today: last.volume,
            volume_avg_20: average_volume(&volumes, VOLUME_WINDOW),
            rvol: rvol(&volumes, VOLUME_WINDOW),
            golden_crosses,
            dead_crosses,
            rows,
        })
    }

    /// 최근 `n`개 행 (최신순).
    pub fn recent(&self, n: usize) -> Vec<&DashboardRow> {
        self.rows.iter().rev().take(n).collect()
    }

    /// 전체 행 (최신순).
    pub fn newest_first(&self) -> impl Iterator<Item = &DashboardRow> {
        self.rows.iter().rev()
    }
}

/// 데이터가 기간보다 짧으면 전부 None (값이 없는 열).
fn moving_average(closes: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    sma(closes, period).unwrap_or_else(|_| vec![None; closes.len()])
}

/// 시장별 가격 표기: 한국 `71,000 원`, 미국 `189.25 $`.
pub fn format_price(value: Decimal, market: Market) -> String {
    format!(
        "{} {}",
        group_thousands(value, market.decimals()),
        market.unit()
    )
}

/// 거래량 표기: `12,345,678 주`.
pub fn format_volume(volume: u64) -> String {
    format!("{} 주", group_thousands(Decimal::from(volume), 0))
}

/// 소수점 `decimals`자리로 반올림하고 천 단위 쉼표를 넣습니다.
pub fn group_thousands(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp(decimals);
    let text = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
