// ==========================================
// 판매/재고 분석 대시보드 - 판매 추세/차원 요약 집계
// ==========================================
// 용도: 화면의 추세 차트와 집계 테이블에 먹일 순수 집계 함수.
// 기준/비교 2계열: 공유 차원 필터는 동일하게 적용하고 총판만
// 기준(filter.distributors) / 비교(comparison) 따로 건다.
// ==========================================

use crate::domain::record::WeeklyRecord;
use crate::domain::types::RecordKind;
use crate::engine::filter::RecordFilter;
use crate::importer::normalize::month_from_week;
use serde::Serialize;
use std::collections::BTreeMap;

// ==========================================
// 추세 시리즈
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendView {
    Month, // 시간 키 "YY.MM"
    Week,  // 시간 키 "YY.WNN"
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub time_key: String,
    /// 공유 차원 필터만 적용한 전체 합
    pub total: f64,
    /// 기준 총판 (filter.distributors) 합
    pub primary: f64,
    /// 비교 총판 합
    pub comparison: f64,
}

/// 판매량 추세 시리즈 (시간 키 오름차순).
///
/// 날짜 범위 필터가 걸려 있으면 날짜 없는 레코드는 제외된다.
pub fn trend_series(
    records: &[WeeklyRecord],
    filter: &RecordFilter,
    view: TrendView,
    comparison_distributors: &[String],
) -> Vec<TrendPoint> {
    // sort_key → (time_key, total, primary, comparison)
    let mut buckets: BTreeMap<i64, (String, f64, f64, f64)> = BTreeMap::new();

    for record in records {
        if record.kind != RecordKind::Sales {
            continue;
        }
        if !filter.matches_shared_dimensions(record) {
            continue;
        }
        if !filter.date_in_range(&record.date) {
            continue;
        }

        let (time_key, sort_key) = time_bucket(record, view);
        let entry = buckets
            .entry(sort_key)
            .or_insert_with(|| (time_key, 0.0, 0.0, 0.0));

        entry.1 += record.qty;
        if filter.distributors.is_empty()
            || filter.distributors.iter().any(|d| d == &record.distributor)
        {
            entry.2 += record.qty;
        }
        if comparison_distributors
            .iter()
            .any(|d| d == &record.distributor)
        {
            entry.3 += record.qty;
        }
    }

    buckets
        .into_values()
        .map(|(time_key, total, primary, comparison)| TrendPoint {
            time_key,
            total,
            primary,
            comparison,
        })
        .collect()
}

/// 레코드의 시간 버킷 키. 월이 없으면 주차에서 근사한다.
fn time_bucket(record: &WeeklyRecord, view: TrendView) -> (String, i64) {
    let year_short = record.year % 100;
    match view {
        TrendView::Month => {
            let mut month = record.month;
            if month == 0 && record.week > 0 {
                month = month_from_week(record.week);
            }
            let month = month.clamp(1, 12);
            (
                format!("{:02}.{:02}", year_short, month),
                record.year as i64 * 100 + month as i64,
            )
        }
        TrendView::Week => {
            let week = record.week.max(1);
            (
                format!("{:02}.W{:02}", year_short, week),
                record.year as i64 * 100 + week as i64,
            )
        }
    }
}

// ==========================================
// 차원 요약 테이블
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKey {
    Model,
    Distributor,
    Dealer,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSummary {
    pub key: String,
    /// 모델 뷰에서만 의미 있음
    pub chipset: String,
    pub sales: f64,
}

/// 필터 적용 후 지정 차원으로 판매량 합산 (판매량 내림차순).
pub fn summarize_by(
    records: &[WeeklyRecord],
    filter: &RecordFilter,
    key: SummaryKey,
) -> Vec<DimensionSummary> {
    let mut map: BTreeMap<String, DimensionSummary> = BTreeMap::new();

    for record in records {
        if !filter.matches(record) {
            continue;
        }
        let (group_key, chipset) = match key {
            SummaryKey::Model => (record.model_name.clone(), record.chipset.clone()),
            SummaryKey::Distributor => (record.distributor.clone(), String::new()),
            SummaryKey::Dealer => (record.dealer_name.clone(), String::new()),
        };

        let entry = map
            .entry(group_key.clone())
            .or_insert_with(|| DimensionSummary {
                key: group_key,
                chipset,
                sales: 0.0,
            });
        if record.kind == RecordKind::Sales {
            entry.sales += record.qty;
        }
    }

    let mut summaries: Vec<DimensionSummary> = map.into_values().collect();
    summaries.sort_by(|a, b| {
        b.sales
            .partial_cmp(&a.sales)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{RecordKind, UNKNOWN};

    fn record(
        date: &str,
        year: i32,
        month: i32,
        week: i32,
        distributor: &str,
        model: &str,
        qty: f64,
    ) -> WeeklyRecord {
        WeeklyRecord {
            id: String::new(),
            distributor: distributor.to_string(),
            model_name: model.to_string(),
            chipset: UNKNOWN.to_string(),
            category_type: UNKNOWN.to_string(),
            dealer_name: UNKNOWN.to_string(),
            product: UNKNOWN.to_string(),
            qty,
            year,
            month,
            week,
            date: date.to_string(),
            kind: RecordKind::Sales,
            status: String::new(),
            row_index: 2,
            raw_date: None,
        }
    }

    #[test]
    fn test_trend_series_monthly_buckets() {
        let records = vec![
            record("2024-01-05", 2024, 1, 1, "A", "M1", 10.0),
            record("2024-01-20", 2024, 1, 3, "B", "M1", 5.0),
            record("2024-02-03", 2024, 2, 5, "A", "M1", 7.0),
        ];
        let filter = RecordFilter::default();
        let series = trend_series(&records, &filter, TrendView::Month, &[]);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].time_key, "24.01");
        assert_eq!(series[0].total, 15.0);
        assert_eq!(series[1].time_key, "24.02");
        assert_eq!(series[1].total, 7.0);
    }

    #[test]
    fn test_trend_series_primary_vs_comparison() {
        let records = vec![
            record("2024-01-05", 2024, 1, 1, "A", "M1", 10.0),
            record("2024-01-06", 2024, 1, 1, "B", "M1", 5.0),
        ];
        let filter = RecordFilter {
            distributors: vec!["A".to_string()],
            ..Default::default()
        };
        let comparison = vec!["B".to_string()];
        let series = trend_series(&records, &filter, TrendView::Month, &comparison);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].total, 15.0); // 총판 필터와 무관한 전체
        assert_eq!(series[0].primary, 10.0);
        assert_eq!(series[0].comparison, 5.0);
    }

    #[test]
    fn test_trend_series_month_from_week_fallback() {
        let records = vec![record("MISSING_DATE", 2024, 0, 5, "A", "M1", 3.0)];
        let filter = RecordFilter::default();
        let series = trend_series(&records, &filter, TrendView::Month, &[]);
        // week 5 → ceil(5/4.35) = 2월
        assert_eq!(series[0].time_key, "24.02");
    }

    #[test]
    fn test_summarize_by_model_sorted_desc() {
        let records = vec![
            record("2024-01-05", 2024, 1, 1, "A", "M1", 10.0),
            record("2024-01-06", 2024, 1, 1, "A", "M2", 30.0),
            record("2024-01-07", 2024, 1, 1, "B", "M1", 5.0),
        ];
        let filter = RecordFilter::default();
        let summary = summarize_by(&records, &filter, SummaryKey::Model);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].key, "M2");
        assert_eq!(summary[0].sales, 30.0);
        assert_eq!(summary[1].key, "M1");
        assert_eq!(summary[1].sales, 15.0);
    }

    #[test]
    fn test_summarize_by_distributor() {
        let records = vec![
            record("2024-01-05", 2024, 1, 1, "A", "M1", 10.0),
            record("2024-01-06", 2024, 1, 1, "B", "M2", 20.0),
        ];
        let filter = RecordFilter::default();
        let summary = summarize_by(&records, &filter, SummaryKey::Distributor);
        assert_eq!(summary[0].key, "B");
        assert_eq!(summary[1].key, "A");
    }
}
