// ==========================================
// 판매/재고 분석 대시보드 - 런레이트 분석 엔진
// ==========================================
// 입력: 병합된 주간 레코드 + 현재 스냅샷 + 윈도/목표 파라미터 + 필터
// 출력: (총판, 모델) 단위 런레이트/WOS/오더 제안 행
// 2단 설계: 총판+모델 단위로 먼저 계산하고, 필요 시 모델 단위로
//           재집계한다 (재고가 총판별로 관리될 수도, 아닐 수도 있어
//           한 번의 계산으로 두 가지 표현을 모두 지원해야 함).
// ==========================================

use crate::domain::record::{SnapshotEntry, WeeklyRecord};
use crate::domain::types::{RecordKind, MISSING_DATE, UNKNOWN, WOS_INFINITE};
use crate::engine::filter::RecordFilter;
use crate::importer::calendar::{iso_week, monday_of_iso_week, trailing_weeks};
use crate::importer::normalize::to_date_key;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

// ==========================================
// 파라미터 / 결과 타입
// ==========================================

#[derive(Debug, Clone, Copy)]
pub struct RunRateParams {
    /// 추적 윈도 주수 W (런레이트 분모)
    pub window_weeks: u32,
    /// 목표 커버리지 주수 T (오더 제안 기준)
    pub target_weeks: u32,
}

impl Default for RunRateParams {
    fn default() -> Self {
        Self {
            window_weeks: 4,
            target_weeks: 8,
        }
    }
}

/// (총판, 모델) 단위 분석 행
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRateRow {
    pub distributor: String,
    pub model_name: String,
    pub chipset: String,
    pub product: String,
    pub category_type: String,
    pub dealer_name: String,
    /// 윈도 내 총 판매량
    pub total_window_sales: f64,
    /// 주당 평균 판매량 (총 판매 / W)
    pub run_rate: f64,
    pub stock: f64,
    pub po: f64,
    pub otw: f64,
    /// 재고 커버리지 주수. 소비 없이 재고만 있으면 999 센티널.
    pub weeks_of_supply: f64,
    /// 목표 주수 대비 부족분 (0 미만으로 내려가지 않음)
    pub suggested_order: i64,
}

/// 모델 단위 재집계 행 (숫자 필드 합산 후 WOS/제안 재계산)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRollup {
    pub model_name: String,
    pub chipset: String,
    pub product: String,
    pub total_window_sales: f64,
    pub run_rate: f64,
    pub stock: f64,
    pub po: f64,
    pub otw: f64,
    pub weeks_of_supply: f64,
    pub suggested_order: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRateReport {
    pub rows: Vec<RunRateRow>,
    /// 기준 주차 표시 문자열 ("2024년 4주차"). 데이터 없으면 "N/A".
    pub reference_week: String,
    /// 윈도 시작일 (가장 오래된 주의 월요일, "YYYY-MM-DD")
    pub window_start: String,
    /// 윈도 종료일 (최신 판매일, 주 경계와 무관)
    pub window_end: String,
    /// 표시용 범위 ("24.01.01 ~ 24.01.28")
    pub window_label: String,
}

// ==========================================
// 분석 본체
// ==========================================

/// 런레이트/재고 충분성 분석.
///
/// 1) 필터에 걸린 판매 레코드 중 최신 유효 날짜를 찾고
/// 2) 그 날짜의 ISO 주차에서 끝나는 W개 주차 목록을 역산한 뒤
/// 3) [가장 오래된 주의 월요일, 최신 판매일] 범위의 판매를 집계한다.
///
/// 필터의 날짜 범위는 무시한다 - 윈도 자체가 날짜 경계를 정의한다.
pub fn analyze(
    records: &[WeeklyRecord],
    snapshot: &[SnapshotEntry],
    params: RunRateParams,
    filter: &RecordFilter,
) -> RunRateReport {
    let window_weeks = params.window_weeks.max(1);

    // === 1단계: 최신 유효 판매일 탐색 ===
    let Some(latest_date) = latest_sale_date(records, filter) else {
        return RunRateReport {
            reference_week: "N/A".to_string(),
            ..Default::default()
        };
    };

    // === 2~4단계: 주차 역산으로 추적 윈도 확정 ===
    let latest_week = iso_week(latest_date);
    let week_list = trailing_weeks(latest_week, window_weeks as usize);
    let Some(oldest) = week_list.last() else {
        return RunRateReport {
            reference_week: "N/A".to_string(),
            ..Default::default()
        };
    };
    let Some(window_start) = monday_of_iso_week(oldest.year, oldest.week) else {
        return RunRateReport {
            reference_week: "N/A".to_string(),
            ..Default::default()
        };
    };

    let start_key = to_date_key(window_start);
    let end_key = to_date_key(latest_date);
    debug!(
        reference_week = %latest_week,
        window = %format!("{} ~ {}", start_key, end_key),
        weeks = window_weeks,
        "런레이트 윈도 확정"
    );

    // === 5~6단계: 윈도 내 판매를 (총판, 모델)로 합산 ===
    let mut sales_map: BTreeMap<(String, String), f64> = BTreeMap::new();
    for record in records {
        if record.kind != RecordKind::Sales {
            continue;
        }
        if record.date.is_empty() || record.date == MISSING_DATE {
            continue;
        }
        if record.date.as_str() < start_key.as_str() || record.date.as_str() > end_key.as_str() {
            continue;
        }
        if !filter.matches_dimensions(record) {
            continue;
        }
        *sales_map
            .entry((record.distributor.clone(), record.model_name.clone()))
            .or_insert(0.0) += record.qty;
    }

    // === 8단계: 스냅샷과 판매의 키 합집합 ===
    let mut keys: BTreeSet<(String, String)> = sales_map.keys().cloned().collect();
    for entry in snapshot {
        keys.insert((entry.distributor.clone(), entry.model_name.clone()));
    }

    // === 9~10단계: 행 계산 ===
    let mut rows = Vec::new();
    for (distributor, model_name) in keys {
        let total_window_sales = sales_map
            .get(&(distributor.clone(), model_name.clone()))
            .copied()
            .unwrap_or(0.0);
        let run_rate = total_window_sales / window_weeks as f64;

        let snap = snapshot
            .iter()
            .find(|s| s.distributor == distributor && s.model_name == model_name);
        let stock = snap.map(stock_of).unwrap_or(0.0);
        let po = snap.map(|s| s.po_qty).unwrap_or(0.0);
        let otw = snap.map(|s| s.otw_qty).unwrap_or(0.0);

        // 전부 0이면 보고할 것이 없음
        if stock == 0.0 && run_rate == 0.0 && po == 0.0 && otw == 0.0 {
            continue;
        }

        let total_available = stock + po + otw;
        let weeks_of_supply = weeks_of_supply(total_available, run_rate);
        let suggested_order =
            suggested_order(run_rate, params.target_weeks, total_available);

        // 스냅샷에 없는 메타데이터는 판매 이력에서 보강
        let enrich = find_history_meta(records, &model_name);
        let chipset = snap
            .map(|s| s.chipset.clone())
            .filter(|c| c != UNKNOWN)
            .or_else(|| enrich.as_ref().map(|r| r.chipset.clone()))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let product = snap
            .and_then(|s| s.product.clone())
            .filter(|p| p != UNKNOWN)
            .or_else(|| enrich.as_ref().map(|r| r.product.clone()))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let category_type = enrich
            .as_ref()
            .map(|r| r.category_type.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let dealer_name = enrich
            .as_ref()
            .map(|r| r.dealer_name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        rows.push(RunRateRow {
            distributor,
            model_name,
            chipset,
            product,
            category_type,
            dealer_name,
            total_window_sales,
            run_rate,
            stock,
            po,
            otw,
            weeks_of_supply,
            suggested_order,
        });
    }

    rows.sort_by(|a, b| {
        b.run_rate
            .partial_cmp(&a.run_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    RunRateReport {
        rows,
        reference_week: format!("{}년 {}주차", latest_week.year, latest_week.week),
        window_label: format!("{} ~ {}", short_date(&start_key), short_date(&end_key)),
        window_start: start_key,
        window_end: end_key,
    }
}

/// 모델 단위 재집계.
///
/// 숫자 필드는 합산하고 WOS/오더 제안은 합산값에서 다시 계산한다
/// (총판별 값의 평균을 내지 않는다 - 비율의 평균은 비율이 아니므로).
pub fn aggregate_by_model(rows: &[RunRateRow], target_weeks: u32) -> Vec<ModelRollup> {
    let mut grouped: BTreeMap<String, ModelRollup> = BTreeMap::new();

    for row in rows {
        let entry = grouped
            .entry(row.model_name.clone())
            .or_insert_with(|| ModelRollup {
                model_name: row.model_name.clone(),
                chipset: row.chipset.clone(),
                product: row.product.clone(),
                total_window_sales: 0.0,
                run_rate: 0.0,
                stock: 0.0,
                po: 0.0,
                otw: 0.0,
                weeks_of_supply: 0.0,
                suggested_order: 0,
            });
        entry.total_window_sales += row.total_window_sales;
        entry.run_rate += row.run_rate;
        entry.stock += row.stock;
        entry.po += row.po;
        entry.otw += row.otw;
        if entry.chipset == UNKNOWN && row.chipset != UNKNOWN {
            entry.chipset = row.chipset.clone();
        }
        if entry.product == UNKNOWN && row.product != UNKNOWN {
            entry.product = row.product.clone();
        }
    }

    let mut rollups: Vec<ModelRollup> = grouped
        .into_values()
        .map(|mut rollup| {
            let total_available = rollup.stock + rollup.po + rollup.otw;
            rollup.weeks_of_supply = weeks_of_supply(total_available, rollup.run_rate);
            rollup.suggested_order =
                suggested_order(rollup.run_rate, target_weeks, total_available);
            rollup
        })
        .filter(|r| r.stock > 0.0 || r.run_rate > 0.0 || r.po > 0.0 || r.otw > 0.0)
        .collect();

    rollups.sort_by(|a, b| {
        b.run_rate
            .partial_cmp(&a.run_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rollups
}

// ==========================================
// 수치 규칙
// ==========================================

/// 재고 커버리지 주수.
///
/// 런레이트 0에서의 0 나눗셈은 센티널로 처리한다:
/// 재고가 있으면 999 (사실상 무한 커버리지, 정렬/표시 가능),
/// 재고도 없으면 0.
fn weeks_of_supply(total_available: f64, run_rate: f64) -> f64 {
    if run_rate > 0.0 {
        total_available / run_rate
    } else if total_available > 0.0 {
        WOS_INFINITE
    } else {
        0.0
    }
}

/// 오더 제안 수량: ceil(런레이트 × 목표주수 − 총가용), 하한 0.
fn suggested_order(run_rate: f64, target_weeks: u32, total_available: f64) -> i64 {
    let suggestion = run_rate * target_weeks as f64 - total_available;
    if suggestion <= 0.0 {
        0
    } else {
        suggestion.ceil() as i64
    }
}

/// 가용 재고: 정상가용이 0이면 합계수량으로 대체
fn stock_of(entry: &SnapshotEntry) -> f64 {
    if entry.available_stock != 0.0 {
        entry.available_stock
    } else {
        entry.total_stock
    }
}

// ==========================================
// 내부 헬퍼
// ==========================================

/// 필터에 걸린 판매 레코드의 최신 유효 날짜
fn latest_sale_date(records: &[WeeklyRecord], filter: &RecordFilter) -> Option<NaiveDate> {
    records
        .iter()
        .filter(|r| r.kind == RecordKind::Sales)
        .filter(|r| filter.matches_dimensions(r))
        .filter_map(|r| {
            if r.date.is_empty() || r.date == MISSING_DATE {
                None
            } else {
                NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").ok()
            }
        })
        .max()
}

/// 칩셋이 채워진 판매 이력에서 모델 메타데이터 보강용 레코드 탐색
fn find_history_meta<'a>(records: &'a [WeeklyRecord], model_name: &str) -> Option<&'a WeeklyRecord> {
    records
        .iter()
        .find(|r| r.model_name == model_name && r.chipset != UNKNOWN)
}

/// "YYYY-MM-DD" → "YY.MM.DD"
fn short_date(key: &str) -> String {
    let parts: Vec<&str> = key.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 {
        return key.to_string();
    }
    format!("{}.{}.{}", &parts[0][2..], parts[1], parts[2])
}
