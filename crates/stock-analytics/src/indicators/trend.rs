//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - 골든/데드 크로스

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// 교차 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossKind {
    /// 단기선이 장기선을 상향 돌파 (매수 신호)
    Golden,
    /// 단기선이 장기선을 하향 돌파 (매도 신호)
    Dead,
}

/// 교차 발생 시점.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossSignal {
    /// 시계열 상 위치
    pub index: usize,
    pub kind: CrossKind,
}

fn validate(len: usize, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }
    if len < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided: len,
        });
    }
    Ok(())
}

/// 단순 이동평균 (SMA) 계산.
///
/// SMA = (P1 + P2 + ... + Pn) / n
///
/// # 반환
/// 각 시점의 SMA 값 (처음 period-1개는 None)
pub fn sma(prices: &[Decimal], period: usize) -> IndicatorResult<Vec<Option<Decimal>>> {
    validate(prices.len(), period)?;

    let period_decimal = Decimal::from(period);
    let mut result = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        if i < period - 1 {
            result.push(None);
        } else {
            let sum: Decimal = prices[i + 1 - period..=i].iter().sum();
            result.push(Some(sum / period_decimal));
        }
    }

    Ok(result)
}

/// 지수 이동평균 (EMA) 계산.
///
/// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1).
/// 첫 값은 처음 period개의 SMA로 시작합니다.
pub fn ema(prices: &[Decimal], period: usize) -> IndicatorResult<Vec<Option<Decimal>>> {
    validate(prices.len(), period)?;

    let multiplier = dec!(2) / Decimal::from(period + 1);
    let mut result = vec![None; period - 1];

    let initial_sma: Decimal = prices[..period].iter().sum::<Decimal>() / Decimal::from(period);
    result.push(Some(initial_sma));

    let mut prev_ema = initial_sma;
    for price in prices.iter().skip(period) {
        let ema = (*price * multiplier) + (prev_ema * (Decimal::ONE - multiplier));
        result.push(Some(ema));
        prev_ema = ema;
    }

    Ok(result)
}

/// 골든 크로스 감지.
///
/// 이전: 단기 < 장기, 현재: 단기 > 장기
#[allow(clippy::needless_range_loop)]
pub fn detect_golden_cross(short_ma: &[Option<Decimal>], long_ma: &[Option<Decimal>]) -> Vec<bool> {
    let mut result = vec![false; short_ma.len()];

    for i in 1..short_ma.len().min(long_ma.len()) {
        if let (Some(prev_short), Some(prev_long), Some(curr_short), Some(curr_long)) =
            (short_ma[i - 1], long_ma[i - 1], short_ma[i], long_ma[i])
        {
            result[i] = prev_short < prev_long && curr_short > curr_long;
        }
    }

    result
}

/// 데드 크로스 감지.
///
/// 이전: 단기 > 장기, 현재: 단기 < 장기
#[allow(clippy::needless_range_loop)]
pub fn detect_dead_cross(short_ma: &[Option<Decimal>], long_ma: &[Option<Decimal>]) -> Vec<bool> {
    let mut result = vec![false; short_ma.len()];

    for i in 1..short_ma.len().min(long_ma.len()) {
        if let (Some(prev_short), Some(prev_long), Some(curr_short), Some(curr_long)) =
            (short_ma[i - 1], long_ma[i - 1], short_ma[i], long_ma[i])
        {
            result[i] = prev_short > prev_long && curr_short < curr_long;
        }
    }

    result
}

/// 골든/데드 크로스 발생 시점 목록 (시간순).
pub fn cross_signals(short_ma: &[Option<Decimal>], long_ma: &[Option<Decimal>]) -> Vec<CrossSignal> {
    let golden = detect_golden_cross(short_ma, long_ma);
    let dead = detect_dead_cross(short_ma, long_ma);

    golden
        .iter()
        .zip(dead.iter())
        .enumerate()
        .filter_map(|(index, (&g, &d))| match (g, d) {
            (true, _) => Some(CrossSignal {
                index,
                kind: CrossKind::Golden,
            }),
            (_, true) => Some(CrossSignal {
                index,
                kind: CrossKind::Dead,
            }),
            _ => None,
        })
        .collect()
}
