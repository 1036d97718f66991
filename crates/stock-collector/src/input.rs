//! 티커 목록 입력.
//!
//! 엑셀(.xlsx/.xls/.xlsm), CSV 파일 또는 `티커,이름; 티커,이름` 형식의 텍스트를
//! [`TickerRequest`] 목록으로 바꿉니다. 헤더는 별칭 목록으로 한 번만 찾으며,
//! 필수 컬럼이 없으면 다운로드를 시작하기 전에 [`CollectorError::InputFormat`]을 반환합니다.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use stock_core::TickerRequest;
use tracing::{debug, info};

use crate::{CollectorError, Result};

/// 컬럼 헤더 별칭.
///
/// 헤더를 소문자로 바꾼 뒤 별칭과 같거나 별칭을 포함하면 해당 컬럼으로 봅니다.
/// 티커 컬럼을 먼저 찾고, 종목명 컬럼은 티커 컬럼을 제외하고 찾습니다.
#[derive(Debug, Clone)]
pub struct HeaderAliases {
    pub ticker: Vec<String>,
    pub name: Vec<String>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self::new(&["티커", "ticker", "symbol"], &["명", "name"])
    }
}

impl HeaderAliases {
    pub fn new(ticker: &[&str], name: &[&str]) -> Self {
        Self {
            ticker: ticker.iter().map(|s| s.to_lowercase()).collect(),
            name: name.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// (티커 컬럼, 종목명 컬럼) 위치를 찾습니다.
    ///
    /// 별칭과 정확히 같은 헤더를 먼저 찾고, 없을 때만 포함 여부로 찾습니다.
    pub fn resolve(&self, headers: &[String]) -> Result<(usize, usize)> {
        let headers_lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let ticker_col = find_column(&headers_lower, &self.ticker, None);
        let name_col = find_column(&headers_lower, &self.name, ticker_col);

        match (ticker_col, name_col) {
            (Some(t), Some(n)) => Ok((t, n)),
            _ => Err(CollectorError::InputFormat(format!(
                "티커 컬럼({})과 종목명 컬럼({})이 필요합니다. 찾은 컬럼: [{}]",
                self.ticker.join("/"),
                self.name.join("/"),
                headers.join(", ")
            ))),
        }
    }
}

fn find_column(headers: &[String], aliases: &[String], skip: Option<usize>) -> Option<usize> {
    let candidates = || {
        headers
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != skip)
    };
    candidates()
        .find(|(_, h)| aliases.iter().any(|alias| *h == alias))
        .or_else(|| candidates().find(|(_, h)| aliases.iter().any(|alias| h.contains(alias.as_str()))))
        .map(|(i, _)| i)
}

/// 티커 목록 파일을 읽습니다. 확장자로 형식을 판단합니다.
pub fn read_ticker_file(path: impl AsRef<Path>, aliases: &HeaderAliases) -> Result<Vec<TickerRequest>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "xlsx" | "xls" | "xlsm" => read_excel_rows(path)?,
        "csv" => read_csv_rows(path)?,
        other => {
            return Err(CollectorError::InputFormat(format!(
                "지원하지 않는 파일 형식: '{}' (xlsx, xls, csv만 가능)",
                other
            )));
        }
    };

    let requests = requests_from_rows(rows, aliases)?;
    info!(path = %path.display(), count = requests.len(), "티커 목록 로드");
    Ok(requests)
}

/// `티커,이름; 티커,이름` 형식의 텍스트를 파싱합니다.
///
/// - 항목은 `;` 또는 줄바꿈으로 나눕니다.
/// - 쉼표가 없으면 티커를 이름으로도 씁니다.
/// - 첫 번째 쉼표에서만 나눕니다.
/// - 빈 항목은 무시하며, 항목이 하나도 없으면 에러입니다.
pub fn parse_free_text(text: &str) -> Result<Vec<TickerRequest>> {
    let requests: Vec<TickerRequest> = text
        .split(['\n', ';'])
        .filter_map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return None;
            }
            let request = match item.split_once(',') {
                Some((ticker, name)) => TickerRequest::new(ticker, name),
                None => TickerRequest::new(item, item),
            };
            (!request.symbol.is_empty()).then_some(request)
        })
        .collect();

    if requests.is_empty() {
        return Err(CollectorError::InputFormat(
            "입력된 종목이 없습니다. 예: 005930,삼성전자; AAPL,애플".to_string(),
        ));
    }
    debug!(count = requests.len(), "직접 입력 파싱");
    Ok(requests)
}

/// 첫 행을 헤더로 보고 요청 목록을 만듭니다. 티커가 빈 행은 건너뜁니다.
fn requests_from_rows(rows: Vec<Vec<String>>, aliases: &HeaderAliases) -> Result<Vec<TickerRequest>> {
    let mut rows = rows.into_iter();
    let headers = rows
        .next()
        .ok_or_else(|| CollectorError::InputFormat("파일이 비어 있습니다".to_string()))?;
    let (ticker_col, name_col) = aliases.resolve(&headers)?;

    let requests = rows
        .filter_map(|row| {
            let ticker = row.get(ticker_col).map(|s| s.trim()).unwrap_or_default();
            if ticker.is_empty() {
                return None;
            }
            let name = row
                .get(name_col)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .unwrap_or(ticker);
            Some(TickerRequest::new(ticker, name))
        })
        .collect();

    Ok(requests)
}

fn read_excel_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        CollectorError::InputFormat(format!("엑셀 파일을 열 수 없습니다 ({}): {}", path.display(), e))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CollectorError::InputFormat("엑셀 파일에 시트가 없습니다".to_string()))?
        .map_err(|e| CollectorError::InputFormat(format!("시트를 읽을 수 없습니다: {}", e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// 엑셀 셀 → 문자열.
///
/// 숫자로 저장된 6자리 이하 정수는 한국 종목 코드로 보고 앞에 0을 채웁니다 (5930 → 005930).
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => pad_code(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => pad_code(*f as i64),
        other => other.to_string(),
    }
}

fn pad_code(value: i64) -> String {
    if (0..1_000_000).contains(&value) {
        format!("{:06}", value)
    } else {
        value.to_string()
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CollectorError::InputFormat(format!("CSV 파일을 열 수 없습니다: {}", e)))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| CollectorError::InputFormat(format!("CSV 파싱 실패: {}", e)))?;
        let row: Vec<String> = record
            .iter()
            .map(|field| field.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
