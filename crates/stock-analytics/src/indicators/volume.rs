//! 거래량/변동률 지표.
//!
//! ## RVOL (Relative Volume)
//! 당일 거래량을 최근 N일 평균 거래량(정수로 버림)으로 나눈 값입니다.
//! 1.0보다 크면 평소보다 거래가 활발하다는 뜻이며, 평균이 0이면 0을 반환합니다.

use rust_decimal::Decimal;

/// 최근 `window`개 거래량의 평균 (소수점 이하 버림).
pub fn average_volume(volumes: &[u64], window: usize) -> u64 {
    if volumes.is_empty() || window == 0 {
        return 0;
    }
    let tail = &volumes[volumes.len().saturating_sub(window)..];
    let sum: u128 = tail.iter().map(|&v| u128::from(v)).sum();
    (sum / tail.len() as u128) as u64
}

/// 상대거래량: 마지막 거래량 / 최근 `window`개 평균.
pub fn rvol(volumes: &[u64], window: usize) -> Decimal {
    let Some(&last) = volumes.last() else {
        return Decimal::ZERO;
    };
    let average = average_volume(volumes, window);
    if average == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(last) / Decimal::from(average)
}

/// 전일 대비 변동률 (0.01 = 1%). 첫 값과 전일 종가가 0인 경우는 None.
pub fn pct_change(closes: &[Decimal]) -> Vec<Option<Decimal>> {
    let mut result = Vec::with_capacity(closes.len());
    for (i, close) in closes.iter().enumerate() {
        let change = match i.checked_sub(1).map(|p| closes[p]) {
            Some(prev) if !prev.is_zero() => Some((*close - prev) / prev),
            _ => None,
        };
        result.push(change);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_average_volume_truncates() {
        assert_eq!(average_volume(&[1, 2], 20), 1);
        // 마지막 3개만 사용: (30 + 40 + 50) / 3 = 40
        assert_eq!(average_volume(&[10, 20, 30, 40, 50], 3), 40);
        assert_eq!(average_volume(&[], 20), 0);
    }

    #[test]
    fn test_rvol() {
        let mut volumes = vec![1_000u64; 19];
        volumes.push(3_000);
        // 평균 = (19_000 + 3_000) / 20 = 1_100
        assert_eq!(rvol(&volumes, 20), dec!(3000) / dec!(1100));
        assert_eq!(rvol(&[0, 0, 0], 20), Decimal::ZERO);
        assert_eq!(rvol(&[], 20), Decimal::ZERO);
    }

    #[test]
    fn test_pct_change() {
        let changes = pct_change(&[dec!(100), dec!(110), dec!(99), dec!(0), dec!(5)]);
        assert_eq!(
            changes,
            vec![None, Some(dec!(0.1)), Some(dec!(-0.1)), Some(dec!(-1)), None]
        );
    }
}
