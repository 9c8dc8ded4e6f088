// ==========================================
// 판매/재고 분석 대시보드 - 워크북 파서
// ==========================================
// 지원: Excel (.xlsx/.xls) / CSV (.csv)
// 입력: 업로드된 파일의 바이트 버퍼 (경로 아님)
// ==========================================

use crate::importer::cell::{CellValue, Row, Sheet, Workbook};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_from_rs, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;

/// 파일명 확장자에 따라 파서를 선택해 워크북을 만든다.
///
/// CSV는 시트 개념이 없으므로 파일명(확장자 제외)을 시트명으로 하는
/// 단일 시트 워크북이 된다. 시트 분류기가 시트명을 보고 동작하므로
/// CSV 업로드도 같은 파이프라인을 그대로 탄다.
pub fn parse_workbook(bytes: &[u8], filename: &str) -> ImportResult<Workbook> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xlsx" => parse_xlsx(bytes, filename),
        "xls" => parse_xls(bytes, filename),
        "csv" => parse_csv(bytes, filename),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

// ==========================================
// Excel (.xlsx)
// ==========================================
fn parse_xlsx(bytes: &[u8], filename: &str) -> ImportResult<Workbook> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_owned();
    if sheet_names.is_empty() {
        return Err(ImportError::EmptyWorkbook(filename.to_string()));
    }

    let mut sheets = Vec::new();
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
        if let Some(sheet) = range_to_sheet(&name, range.rows()) {
            sheets.push(sheet);
        }
    }

    Ok(Workbook { sheets })
}

// ==========================================
// Excel (.xls)
// ==========================================
fn parse_xls(bytes: &[u8], filename: &str) -> ImportResult<Workbook> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xls<_> = open_workbook_from_rs(cursor)
        .map_err(|e: calamine::XlsError| ImportError::ExcelParseError(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_owned();
    if sheet_names.is_empty() {
        return Err(ImportError::EmptyWorkbook(filename.to_string()));
    }

    let mut sheets = Vec::new();
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
        if let Some(sheet) = range_to_sheet(&name, range.rows()) {
            sheets.push(sheet);
        }
    }

    Ok(Workbook { sheets })
}

/// 셀 범위를 Sheet로 변환. 첫 행이 헤더, 완전히 빈 행은 건너뛴다.
/// 데이터 행이 전혀 없는 시트는 None (분류 대상에서 제외).
fn range_to_sheet<'a, I>(name: &str, mut rows: I) -> Option<Sheet>
where
    I: Iterator<Item = &'a [calamine::Data]>,
{
    let header_row = rows.next()?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut parsed_rows = Vec::new();
    for data_row in rows {
        let mut row = Row::new();
        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if header.is_empty() {
                    continue;
                }
                row.push(header.clone(), CellValue::from(cell));
            }
        }
        if row.is_blank() {
            continue;
        }
        parsed_rows.push(row);
    }

    Some(Sheet {
        name: name.to_string(),
        headers,
        rows: parsed_rows,
    })
}

// ==========================================
// CSV
// ==========================================
fn parse_csv(bytes: &[u8], filename: &str) -> ImportResult<Workbook> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 행 길이 불일치 허용
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = Row::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                if header.is_empty() {
                    continue;
                }
                let trimmed = value.trim();
                let cell = if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                };
                row.push(header.clone(), cell);
            }
        }
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    // 시트명 = 파일명 (확장자 제외)
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string();

    Ok(Workbook {
        sheets: vec![Sheet {
            name: stem,
            headers,
            rows,
        }],
    })
}
