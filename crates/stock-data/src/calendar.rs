//! 최근 거래일 탐색.
//!
//! 휴장일 달력을 따로 두지 않고, 날짜별로 목록을 조회해 보고
//! 비어 있지 않은 첫 날짜를 거래일로 판단합니다.

use std::future::Future;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::Result;

/// `today`부터 하루씩 거슬러 올라가며 `probe`가 비어 있지 않은 목록을 돌려주는 첫 날짜를 찾습니다.
///
/// - 토/일요일은 조회하지 않고 건너뜁니다 (탐색 일수에는 포함).
/// - `probe` 에러는 해당 날짜의 빈 결과로 취급합니다.
/// - `lookback`일 안에 찾지 못하면 `None`.
pub async fn recent_business_day<T, F, Fut>(
    today: NaiveDate,
    lookback: u32,
    mut probe: F,
) -> Option<(NaiveDate, Vec<T>)>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    for offset in 0..lookback {
        let date = today - Duration::days(i64::from(offset));
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            debug!(%date, "주말 건너뜀");
            continue;
        }

        match probe(date).await {
            Ok(items) if !items.is_empty() => return Some((date, items)),
            Ok(_) => debug!(%date, "휴장일 (빈 목록)"),
            Err(e) => warn!(%date, error = %e, "거래일 조회 실패"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_skips_weekend_and_holiday() {
        // 2024-01-01(월) 신정 휴장, 2023-12-30/31 주말
        let holiday = date(2024, 1, 1);
        let mut probed = Vec::new();

        let found = recent_business_day(date(2024, 1, 1), 10, |d| {
            probed.push(d);
            async move {
                if d == holiday {
                    Ok(Vec::new())
                } else {
                    Ok(vec!["005930"])
                }
            }
        })
        .await;

        assert_eq!(found, Some((date(2023, 12, 29), vec!["005930"])));
        assert_eq!(probed, vec![date(2024, 1, 1), date(2023, 12, 29)]);
    }

    #[tokio::test]
    async fn test_errors_count_as_empty() {
        let found = recent_business_day(date(2024, 1, 5), 2, |d| async move {
            if d == date(2024, 1, 5) {
                Err(DataError::Listing("timeout".to_string()))
            } else {
                Ok(vec![d])
            }
        })
        .await;

        assert_eq!(found.map(|(d, _)| d), Some(date(2024, 1, 4)));
    }

    #[tokio::test]
    async fn test_gives_up_after_lookback() {
        let found: Option<(NaiveDate, Vec<u8>)> =
            recent_business_day(date(2024, 1, 5), 3, |_| async { Ok(Vec::new()) }).await;
        assert!(found.is_none());
    }
}
