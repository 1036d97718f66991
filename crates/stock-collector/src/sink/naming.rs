//! 파일명/시트명 규칙.

use stock_core::{DateRange, TickerRequest};

/// 엑셀 시트 이름 최대 길이.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// 파일명에 쓸 수 없는 문자.
const UNSAFE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// 시트 이름에 추가로 쓸 수 없는 문자.
const SHEET_UNSAFE_CHARS: &[char] = &['[', ']'];

/// 파일명에 쓸 수 없는 문자를 제거합니다.
pub fn sanitize_file_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 시트 이름: `"{종목명}_{티커}"`에서 금지 문자를 빼고 앞 31자만 사용합니다.
pub fn sheet_name(display_name: &str, ticker: &str) -> String {
    let raw = format!("{}_{}", display_name.trim(), ticker.trim());
    let cleaned: String = raw
        .chars()
        .filter(|c| {
            !UNSAFE_CHARS.contains(c) && !SHEET_UNSAFE_CHARS.contains(c) && !c.is_control()
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    // 작은따옴표로 시작하거나 끝나는 시트 이름은 엑셀이 거부한다
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 종목별 파일명 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileNaming {
    /// `{종목명}_{시작일}_{종료일}.xlsx`
    #[default]
    Dated,
    /// `{종목명}_{티커}.xlsx`
    Plain,
}

impl FileNaming {
    /// 요청 하나에 대한 파일명.
    pub fn file_name(&self, request: &TickerRequest, range: &DateRange) -> String {
        let name = sanitize_file_component(&request.display_name);
        match self {
            Self::Dated => format!("{}_{}_{}.xlsx", name, range.start, range.end),
            Self::Plain => format!(
                "{}_{}.xlsx",
                name,
                sanitize_file_component(&request.symbol)
            ),
        }
    }
}

/// 이미 쓴 이름과 겹치면 ` (2)`, ` (3)` 순으로 번호를 붙입니다.
pub fn dedupe_file_name(name: &str, taken: &mut std::collections::HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (name, String::new()),
    };
    (2..)
        .map(|n| format!("{} ({}){}", stem, n, ext))
        .find(|candidate| taken.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_file_component("S&P 500: 지수/선물?"), "S&P 500 지수선물");
        assert_eq!(sanitize_file_component("  <|>  "), "_");
    }

    #[test]
    fn test_sheet_name_truncated() {
        assert_eq!(sheet_name("삼성전자", "005930"), "삼성전자_005930");
        let long = sheet_name("Berkshire Hathaway Inc. Class B Shares", "BRK-B");
        assert_eq!(long.chars().count(), 31);
        assert!(long.starts_with("Berkshire Hathaway"));
        assert_eq!(sheet_name("[지수]", "^KS11"), "지수_^KS11");
    }

    #[test]
    fn test_file_naming() {
        let request = TickerRequest::new("USD/KRW", "달러/원");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .unwrap();

        assert_eq!(
            FileNaming::Dated.file_name(&request, &range),
            "달러원_2023-01-02_2024-01-02.xlsx"
        );
        assert_eq!(FileNaming::Plain.file_name(&request, &range), "달러원_USDKRW.xlsx");
    }

    #[test]
    fn test_dedupe_file_name() {
        let mut taken = HashSet::new();
        assert_eq!(dedupe_file_name("애플_AAPL.xlsx", &mut taken), "애플_AAPL.xlsx");
        assert_eq!(dedupe_file_name("애플_AAPL.xlsx", &mut taken), "애플_AAPL (2).xlsx");
        assert_eq!(dedupe_file_name("애플_AAPL.xlsx", &mut taken), "애플_AAPL (3).xlsx");
    }

    proptest! {
        #[test]
        fn prop_sheet_name_is_valid(name in "\\PC{0,60}", ticker in "\\PC{0,12}") {
            let sheet = sheet_name(&name, &ticker);
            prop_assert!(!sheet.is_empty());
            prop_assert!(sheet.chars().count() <= MAX_SHEET_NAME_LEN);
            prop_assert!(!sheet.chars().any(|c| UNSAFE_CHARS.contains(&c) || SHEET_UNSAFE_CHARS.contains(&c)));
        }

        #[test]
        fn prop_file_component_is_safe(value in "\\PC{0,80}") {
            let cleaned = sanitize_file_component(&value);
            prop_assert!(!cleaned.is_empty());
            prop_assert!(!cleaned.chars().any(|c| UNSAFE_CHARS.contains(&c)));
        }
    }
}
