// ==========================================
// 판매/재고 분석 대시보드 - 값 정규화기
// ==========================================
// 용도: 원시 셀 값 → 정식 타입 변환 (순수 함수)
// 규칙: 여기의 함수는 절대 실패(Err/panic)하지 않는다.
//       변환 불가는 0 / None / 센티널로 흡수한다.
// ==========================================

use crate::importer::cell::CellValue;
use chrono::{DateTime, NaiveDate};

/// 엑셀 날짜 직렬값 기준일 보정: 1970-01-01까지의 일수
/// (1900년 윤년 버그 포함 오프셋)
const EXCEL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

// ==========================================
// 숫자 파싱
// ==========================================

/// 통화/수량 파싱: 천 단위 콤마와 공백을 걷어내고 실수로 변환.
/// 이미 숫자면 그대로 통과, 변환 불가는 0.
pub fn parse_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Empty => 0.0,
        CellValue::Text(s) => {
            let clean: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            if clean.is_empty() {
                return 0.0;
            }
            clean.parse::<f64>().unwrap_or(0.0)
        }
    }
}

/// 주차 파싱: "W01", "1주" 등에서 숫자만 추출. 불가 시 0.
pub fn parse_week_number(value: &CellValue) -> i32 {
    match value {
        CellValue::Number(n) => *n as i32,
        CellValue::Empty => 0,
        CellValue::Text(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse::<i32>().unwrap_or(0)
        }
    }
}

// ==========================================
// 날짜 파싱
// ==========================================

/// 엑셀 셀의 날짜 해석.
///
/// 숫자면 스프레드시트 날짜 직렬값으로 간주해 기준일 오프셋(25569일)을
/// 적용하고, 문자열이면 일반적인 날짜 형식들을 순서대로 시도한다.
/// 해석 불가 → None.
pub fn parse_excel_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(serial) => {
            let seconds = ((serial - EXCEL_EPOCH_OFFSET_DAYS) * 86400.0).round() as i64;
            DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
        }
        CellValue::Text(s) => parse_date_string(s.trim()),
    }
}

/// 문자열 날짜 해석: ISO 계열 우선, YYYYMMDD 허용.
fn parse_date_string(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
        .or_else(|| {
            // "2024-01-05T09:00:00" 류의 날짜시간 문자열은 앞 10자리만 취함
            s.get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        })
}

/// 날짜 → "YYYY-MM-DD" 키. NaiveDate는 시간대 개념이 없으므로
/// UTC 변환에 의한 하루 밀림이 구조적으로 발생하지 않는다.
pub fn to_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ==========================================
// 파일명 날짜 추출
// ==========================================

/// 파일명에서 `_YYYYMMDD`(8자리) 또는 `_MMDD`(4자리, 올해로 가정)
/// 토큰을 찾아 날짜 키로 돌려준다. 없으면 fallback, 그것도 없으면 today.
pub fn parse_date_from_filename(
    name: &str,
    fallback: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    if let Some(date) = scan_filename_date(name, today) {
        return to_date_key(date);
    }
    to_date_key(fallback.unwrap_or(today))
}

fn scan_filename_date(name: &str, today: NaiveDate) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            let digits: Vec<u8> = bytes[i + 1..]
                .iter()
                .copied()
                .take_while(|b| b.is_ascii_digit())
                .collect();
            if digits.len() >= 8 {
                if let Some(date) = parse_ymd_digits(&digits[..8]) {
                    return Some(date);
                }
            } else if digits.len() >= 4 {
                if let Some(date) = parse_md_digits(&digits[..4], today) {
                    return Some(date);
                }
            }
        }
        i += 1;
    }
    None
}

fn parse_ymd_digits(digits: &[u8]) -> Option<NaiveDate> {
    let s = std::str::from_utf8(digits).ok()?;
    let year: i32 = s[..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_md_digits(digits: &[u8], today: NaiveDate) -> Option<NaiveDate> {
    use chrono::Datelike;
    let s = std::str::from_utf8(digits).ok()?;
    let month: u32 = s[..2].parse().ok()?;
    let day: u32 = s[2..4].parse().ok()?;
    NaiveDate::from_ymd_opt(today.year(), month, day)
}

// ==========================================
// 파생 규칙
// ==========================================

/// 주차 → 월 근사: ceil(week / 4.35), [1, 12] 클램프.
/// 달력상 정확하지 않은 근사이나 원 시스템과의 호환을 위해 유지한다.
pub fn month_from_week(week: i32) -> i32 {
    if week <= 0 {
        return 0;
    }
    let month = (week as f64 / 4.35).ceil() as i32;
    month.clamp(1, 12)
}

/// 모델명 정규화 키: 영숫자 이외 제거 + 대문자화.
/// "RTX 4070_A" → "RTX4070A". 빈 값은 "UNKNOWN".
pub fn normalize_model_key(name: &str) -> String {
    let key: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase();
    if key.is_empty() {
        "UNKNOWN".to_string()
    } else {
        key
    }
}
