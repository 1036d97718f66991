//! 입력 티커 → 조회용 심볼 변환.
//!
//! 사용자는 `005930` 같은 코드 대신 `삼성전자`, `코스피`, `환율`처럼
//! 이름이나 별칭을 입력하기도 합니다. 이 모듈은 그런 입력을
//! Provider가 이해하는 심볼로 바꿉니다.

use std::collections::HashMap;

use stock_core::TickerRequest;
use tracing::debug;

use crate::listing::SymbolMetadata;

/// 지수/환율/가상화폐 별칭 (입력 → 심볼).
pub const INDEX_ALIASES: &[(&str, &str)] = &[
    ("코스피", "^KS11"),
    ("KOSPI", "^KS11"),
    ("코스닥", "^KQ11"),
    ("KOSDAQ", "^KQ11"),
    ("코스피200", "^KS200"),
    ("KOSPI200", "^KS200"),
    ("나스닥", "IXIC"),
    ("NASDAQ", "IXIC"),
    ("S&P500", "US500"),
    ("다우존스", "DJI"),
    ("다우", "DJI"),
    ("달러/원", "USD/KRW"),
    ("환율", "USD/KRW"),
    ("비트코인", "BTC/KRW"),
];

/// 별칭 조회 (대소문자 무시, 앞뒤 공백 무시).
pub fn lookup_alias(input: &str) -> Option<&'static str> {
    let input = input.trim();
    INDEX_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(input))
        .map(|(_, symbol)| *symbol)
}

fn is_alias_target(symbol: &str) -> bool {
    INDEX_ALIASES.iter().any(|(_, target)| *target == symbol)
}

/// 종목명 → 코드 인덱스.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: Vec<SymbolMetadata>,
    by_name: HashMap<String, usize>,
}

impl NameIndex {
    /// 목록 항목으로 인덱스를 만듭니다. 같은 이름이 여러 번 나오면 처음 항목을 씁니다.
    pub fn new(entries: Vec<SymbolMetadata>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_name.entry(entry.name.trim().to_string()).or_insert(i);
        }
        Self { entries, by_name }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 종목명으로 정확히 일치하는 코드 조회.
    pub fn code_for(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name.trim())
            .map(|&i| self.entries[i].ticker.as_str())
    }

    /// 한국 종목 조회: 숫자 코드는 그대로, 아니면 종목명 정확히 일치.
    ///
    /// 반환값은 (코드, 종목명). 목록에 없는 숫자 코드는 코드를 이름으로 씁니다.
    pub fn lookup_kr(&self, input: &str) -> Option<(String, String)> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if input.chars().all(|c| c.is_ascii_digit()) {
            let name = self
                .entries
                .iter()
                .find(|e| e.ticker == input)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| input.to_string());
            return Some((input.to_string(), name));
        }

        self.by_name
            .get(input)
            .map(|&i| &self.entries[i])
            .map(|e| (e.ticker.clone(), e.name.clone()))
    }

    /// 미국 종목 조회: 티커 일치(대소문자 무시) → 회사명 부분 일치(대소문자 무시).
    pub fn lookup_us(&self, input: &str) -> Option<(String, String)> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.ticker.eq_ignore_ascii_case(input))
        {
            return Some((entry.ticker.clone(), entry.name.clone()));
        }

        let needle = input.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase().contains(&needle))
            .map(|e| (e.ticker.clone(), e.name.clone()))
    }
}

/// 요청 심볼 변환기.
#[derive(Debug, Clone, Default)]
pub struct SymbolResolver {
    listing: Option<NameIndex>,
}

impl SymbolResolver {
    /// 별칭만 사용하는 변환기.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목명 목록을 함께 사용하는 변환기.
    pub fn with_listing(listing: NameIndex) -> Self {
        Self {
            listing: Some(listing),
        }
    }

    /// 요청을 조회용 심볼로 변환합니다.
    ///
    /// 1. 티커가 별칭이면 별칭 심볼
    /// 2. 종목명이 별칭이면 별칭 심볼
    /// 3. 숫자 코드나 별칭 심볼이 아니면 목록에서 티커, 종목명 순으로 조회
    /// 4. 그 외에는 입력 그대로
    pub fn resolve(&self, request: &TickerRequest) -> String {
        let symbol = request.symbol.trim();

        if let Some(alias) = lookup_alias(symbol) {
            return alias.to_string();
        }
        if let Some(alias) = lookup_alias(&request.display_name) {
            return alias.to_string();
        }

        let needs_lookup = !symbol.is_empty()
            && !symbol.chars().all(|c| c.is_ascii_digit())
            && !is_alias_target(symbol);

        if needs_lookup {
            if let Some(listing) = &self.listing {
                let found = listing
                    .code_for(symbol)
                    .or_else(|| listing.code_for(&request.display_name));
                if let Some(code) = found {
                    debug!(input = symbol, code, "종목명으로 코드 변환");
                    return code.to_string();
                }
            }
        }

        symbol.to_string()
    }
}
