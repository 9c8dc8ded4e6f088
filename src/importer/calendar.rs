// ==========================================
// 판매/재고 분석 대시보드 - ISO 주차 달력 연산
// ==========================================
// 기준: ISO-8601 (1주차 = 그 해 첫 목요일이 속한 주, 월요일 시작)
// 용도: 런레이트 추적 윈도 산출의 주차 전진/후진
// ==========================================

use crate::domain::types::IsoWeek;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// 날짜의 ISO-8601 연도/주차.
///
/// 연말/연초 경계에서 ISO 연도는 달력 연도와 다를 수 있다
/// (예: 2024-12-30 → 2025-W01).
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    let iw = date.iso_week();
    IsoWeek::new(iw.year(), iw.week())
}

/// ISO 주차의 월요일 날짜 (iso_week의 역연산).
///
/// 해당 연도에 존재하지 않는 주차(53주가 없는 해의 53) → None.
pub fn monday_of_iso_week(year: i32, week: u32) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
}

/// 기준 주차에서 끝나는 최근 count개 주차 목록 (최신 → 과거 순).
///
/// 기준 주의 월요일에서 7일씩 거슬러 올라가며 매번 ISO 주차를
/// 다시 계산한다. 단순 주차 뺄셈과 달리 연도 경계와 52/53주
/// 해를 정확히 처리한다.
pub fn trailing_weeks(latest: IsoWeek, count: usize) -> Vec<IsoWeek> {
    let mut weeks = Vec::with_capacity(count);
    let Some(mut monday) = monday_of_iso_week(latest.year, latest.week) else {
        return weeks;
    };
    for _ in 0..count {
        weeks.push(iso_week(monday));
        monday -= Duration::days(7);
    }
    weeks
}
