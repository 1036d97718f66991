//! 엑셀 워크북 작성.
//!
//! - 종목별 시세: Date, Open, High, Low, Close, Volume (날짜 오름차순)
//! - 다운로드 요약: 티커, 종목명, 상태, 메시지
//! - 조회 결과 내보내기: `Stock Data` 시트, 최신순, 변동률과 이동평균 포함

use std::path::Path;

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use stock_analytics::DashboardSummary;
use stock_core::{FetchResult, PriceSeries};

use crate::Result;

/// 요약 워크북 컬럼.
pub const SUMMARY_HEADERS: [&str; 4] = ["티커", "종목명", "상태", "메시지"];

const SERIES_HEADERS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];
const DASHBOARD_HEADERS: [&str; 11] = [
    "Date", "Open", "High", "Low", "Close", "Volume", "Change", "MA5", "MA10", "MA20", "MA60",
];

/// 조회 결과 내보내기 시트 이름.
pub const DASHBOARD_SHEET: &str = "Stock Data";

fn header_format() -> Format {
    Format::new().set_bold()
}

fn date_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd")
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    Ok(())
}

fn write_date(sheet: &mut Worksheet, row: u32, date: chrono::NaiveDate, format: &Format) -> Result<()> {
    let excel_date = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
    sheet.write_datetime_with_format(row, 0, &excel_date, format)?;
    Ok(())
}

fn write_decimal(sheet: &mut Worksheet, row: u32, col: u16, value: Decimal) -> Result<()> {
    sheet.write_number(row, col, value.to_f64().unwrap_or_default())?;
    Ok(())
}

fn write_optional(sheet: &mut Worksheet, row: u32, col: u16, value: Option<Decimal>) -> Result<()> {
    if let Some(value) = value {
        write_decimal(sheet, row, col, value)?;
    }
    Ok(())
}

/// 종목별 시세 워크북.
pub fn series_workbook(sheet_name: &str, series: &PriceSeries) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;
    write_headers(sheet, &SERIES_HEADERS)?;
    sheet.set_column_width(0, 12)?;

    let date_fmt = date_format();
    for (i, bar) in series.bars.iter().enumerate() {
        let row = i as u32 + 1;
        write_date(sheet, row, bar.date, &date_fmt)?;
        write_decimal(sheet, row, 1, bar.open)?;
        write_decimal(sheet, row, 2, bar.high)?;
        write_decimal(sheet, row, 3, bar.low)?;
        write_decimal(sheet, row, 4, bar.close)?;
        sheet.write_number(row, 5, bar.volume as f64)?;
    }

    Ok(workbook)
}

/// 다운로드 요약 워크북 (요청마다 한 행).
pub fn summary_workbook(results: &[FetchResult]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_headers(sheet, &SUMMARY_HEADERS)?;

    for (i, result) in results.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &result.ticker)?;
        sheet.write_string(row, 1, &result.display_name)?;
        sheet.write_string(row, 2, result.status.to_string())?;
        sheet.write_string(row, 3, &result.message)?;
    }
    sheet.set_column_width(3, 60)?;

    Ok(workbook)
}

/// 조회 결과 워크북 (최신순).
pub fn dashboard_workbook(summary: &DashboardSummary) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(DASHBOARD_SHEET)?;
    write_headers(sheet, &DASHBOARD_HEADERS)?;
    sheet.set_column_width(0, 12)?;

    let date_fmt = date_format();
    for (i, row_data) in summary.newest_first().enumerate() {
        let row = i as u32 + 1;
        write_date(sheet, row, row_data.date, &date_fmt)?;
        write_decimal(sheet, row, 1, row_data.open)?;
        write_decimal(sheet, row, 2, row_data.high)?;
        write_decimal(sheet, row, 3, row_data.low)?;
        write_decimal(sheet, row, 4, row_data.close)?;
        sheet.write_number(row, 5, row_data.volume as f64)?;
        write_optional(sheet, row, 6, row_data.change)?;
        write_optional(sheet, row, 7, row_data.ma5)?;
        write_optional(sheet, row, 8, row_data.ma10)?;
        write_optional(sheet, row, 9, row_data.ma20)?;
        write_optional(sheet, row, 10, row_data.ma60)?;
    }

    Ok(workbook)
}

/// 조회 결과를 엑셀 파일로 저장합니다.
pub fn save_dashboard_workbook(path: impl AsRef<Path>, summary: &DashboardSummary) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        super::ensure_dir(parent)?;
    }
    dashboard_workbook(summary)?.save(path)?;
    Ok(())
}
