// ==========================================
// 판매/재고 분석 대시보드 - 레코드 빌더
// ==========================================
// 용도: 분류된 시트의 행들을 정식 레코드로 변환
// 규칙: 컬럼 탐지는 시트당 1회 (행마다 재탐지하지 않음)
// 규칙: 문제 있는 행도 버리지 않고 진단 status와 함께 보존한다
//       (무필터 정책 - 누락이 하류에서 보이도록)
// ==========================================

use crate::domain::record::{SnapshotEntry, WeeklyRecord};
use crate::domain::types::{
    RecordKind, MISSING_DATE, STATUS_NO_MODEL, STATUS_VALID, STATUS_ZERO_QTY, UNKNOWN,
};
use crate::importer::calendar::iso_week;
use crate::importer::cell::{Row, Sheet};
use crate::importer::column_resolver::{resolve_field, resolve_first, Field};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalize::{
    month_from_week, normalize_model_key, parse_excel_date, parse_number, parse_week_number,
    to_date_key,
};
use chrono::Datelike;
use std::collections::BTreeMap;
use tracing::{debug, warn};

// ==========================================
// 판매 시트 (Invoice Date 기반)
// ==========================================

/// 시트당 1회 탐지한 판매 컬럼 집합
struct SalesColumns<'a> {
    invoice_date: &'a str,
    model: &'a str,
    qty: &'a str,
    distributor: Option<&'a str>,
    chipset: Option<&'a str>,
    category_type: Option<&'a str>,
    dealer: Option<&'a str>,
    product: Option<&'a str>,
}

impl<'a> SalesColumns<'a> {
    fn resolve(headers: &'a [String]) -> Result<Self, String> {
        let invoice_date = resolve_field(headers, Field::InvoiceDate);
        let model = resolve_first(headers, &[Field::TransformedModel, Field::Model]);
        let qty = resolve_field(headers, Field::Qty);

        match (invoice_date, model, qty) {
            (Some(invoice_date), Some(model), Some(qty)) => Ok(Self {
                invoice_date,
                model,
                qty,
                distributor: resolve_field(headers, Field::Distributor),
                chipset: resolve_field(headers, Field::Chipset),
                category_type: resolve_field(headers, Field::CategoryType),
                dealer: resolve_field(headers, Field::Dealer),
                product: resolve_field(headers, Field::Product),
            }),
            _ => {
                let mut missing = Vec::new();
                if invoice_date.is_none() {
                    missing.push("Invoice Date");
                }
                if model.is_none() {
                    missing.push("변환 Model Name");
                }
                if qty.is_none() {
                    missing.push("QTY");
                }
                Err(missing.join(", "))
            }
        }
    }
}

/// Invoice Date 기반 판매 시트 1장을 레코드 목록으로 변환.
///
/// 필수 헤더(날짜/모델/수량)가 없으면 MissingHeaders 에러를 돌려주고,
/// 호출 측(ingest)이 경고로 기록한 뒤 다음 시트를 계속 처리한다.
pub fn build_sales_records(sheet: &Sheet) -> ImportResult<Vec<WeeklyRecord>> {
    let cols = SalesColumns::resolve(&sheet.headers).map_err(|missing| {
        ImportError::MissingHeaders {
            sheet: sheet.name.clone(),
            missing,
        }
    })?;

    let mut records = Vec::with_capacity(sheet.rows.len());
    for (index, row) in sheet.rows.iter().enumerate() {
        records.push(build_sales_row(&cols, row, index));
    }

    debug!(sheet = %sheet.name, rows = records.len(), "판매 시트 변환 완료");
    Ok(records)
}

fn build_sales_row(cols: &SalesColumns<'_>, row: &Row, index: usize) -> WeeklyRecord {
    let raw_date = row.get_or_empty(Some(cols.invoice_date));
    let date_val = parse_excel_date(raw_date);
    let qty = parse_number(row.get_or_empty(Some(cols.qty)));
    let model = row
        .get_or_empty(Some(cols.model))
        .as_trimmed_text()
        .unwrap_or_default();

    let dimension = |col: Option<&str>| -> String {
        row.get_or_empty(col)
            .as_trimmed_text()
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    // 행 진단: 왜 누락될 뻔했는지 기록 (필터링은 하지 않음)
    let status = if date_val.is_none() {
        format!("날짜 변환 실패 (Raw: {})", raw_date.render())
    } else if qty == 0.0 {
        STATUS_ZERO_QTY.to_string()
    } else if model.is_empty() || model.eq_ignore_ascii_case("UNKNOWN") {
        STATUS_NO_MODEL.to_string()
    } else {
        STATUS_VALID.to_string()
    };

    let date_str = date_val
        .map(to_date_key)
        .unwrap_or_else(|| MISSING_DATE.to_string());

    // 고유 키에 행 번호를 포함해, 날짜+모델이 같은 서로 다른
    // 원본 행(정당한 중복 거래)이 절대 병합되지 않게 한다.
    let id = format!("ROW_{}_{}_{}", index, date_str, normalize_model_key(&model));

    let (year, week, month) = match date_val {
        Some(d) => {
            let iw = iso_week(d);
            (iw.year, iw.week as i32, d.month() as i32)
        }
        None => (0, 0, 0),
    };

    WeeklyRecord {
        id,
        distributor: dimension(cols.distributor),
        model_name: model,
        chipset: dimension(cols.chipset),
        category_type: dimension(cols.category_type),
        dealer_name: dimension(cols.dealer),
        product: dimension(cols.product),
        qty,
        year,
        month,
        week,
        date: date_str,
        kind: RecordKind::Sales,
        status,
        row_index: index + 2, // 엑셀 행 번호 (헤더 제외 2부터)
        raw_date: raw_date.as_trimmed_text(),
    }
}

// ==========================================
// 주차 그리드 시트 (Year/Week 컬럼 기반)
// ==========================================

/// Invoice Date 없이 연도/주차 컬럼으로 구성된 시트
/// (레거시 "Sell-out raw" / "Inventory raw" 레이아웃).
///
/// 모델명이 없는 행은 건너뛴다 (집계 의미가 없음).
pub fn build_weekly_grid_records(sheet: &Sheet, kind: RecordKind) -> Vec<WeeklyRecord> {
    let headers = &sheet.headers;
    let model_col = resolve_first(headers, &[Field::TransformedModel, Field::Model]);
    let Some(model_col) = model_col else {
        warn!(sheet = %sheet.name, "모델 컬럼 미검출, 시트 건너뜀");
        return Vec::new();
    };

    let chipset_col = resolve_first(headers, &[Field::Chipset, Field::ItemGroup]);
    let product_col = resolve_field(headers, Field::Product);
    let dist_col = resolve_field(headers, Field::Distributor);
    let qty_col = resolve_field(headers, Field::Qty);
    let year_col = resolve_field(headers, Field::Year);
    let month_col = resolve_field(headers, Field::Month);
    let week_col = resolve_field(headers, Field::Week);
    let dealer_col = resolve_field(headers, Field::Dealer);
    let type_col = resolve_field(headers, Field::CategoryType);

    let mut records = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate() {
        let Some(model) = row.get_or_empty(Some(model_col)).as_trimmed_text() else {
            continue;
        };

        let qty = parse_number(row.get_or_empty(qty_col));
        let year = match parse_number(row.get_or_empty(year_col)) as i32 {
            0 => 2024, // 연도 컬럼이 없는 레거시 시트의 기본값
            y => y,
        };
        let week = parse_week_number(row.get_or_empty(week_col));
        let mut month = parse_week_number(row.get_or_empty(month_col));
        if month == 0 && week > 0 {
            month = month_from_week(week);
        }

        let dimension = |col: Option<&str>| -> String {
            row.get_or_empty(col)
                .as_trimmed_text()
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        records.push(WeeklyRecord {
            id: format!("ROW_{}_{}_{}", index, MISSING_DATE, normalize_model_key(&model)),
            distributor: dimension(dist_col),
            model_name: model,
            chipset: dimension(chipset_col),
            category_type: dimension(type_col),
            dealer_name: dimension(dealer_col),
            product: dimension(product_col),
            qty,
            year,
            month,
            week,
            date: MISSING_DATE.to_string(),
            kind,
            status: STATUS_VALID.to_string(),
            row_index: index + 2,
            raw_date: None,
        });
    }

    debug!(sheet = %sheet.name, rows = records.len(), kind = %kind, "주차 그리드 시트 변환 완료");
    records
}

// ==========================================
// 재고 스냅샷 시트 (2-패스: 최신 주차 탐색 → 해당 주차만 수집)
// ==========================================

pub struct SnapshotBuild {
    pub entries: Vec<SnapshotEntry>,
    /// "2026-W01" 형식. 최신 주차를 찾지 못하면 None.
    pub reference_week: Option<String>,
}

/// 재고 시트를 스냅샷으로 변환.
///
/// 패스 1에서 시트 내 최대 (연도, 주차)를 찾고, 패스 2에서 그 주차의
/// 행만 엔트리로 수집한다. 행 단위로 보존하며 미리 집계하지 않는다
/// (총판 단위 분석을 위해).
pub fn build_snapshot(sheet: &Sheet) -> ImportResult<SnapshotBuild> {
    let headers = &sheet.headers;
    let year_col = resolve_field(headers, Field::Year);
    let week_col = resolve_field(headers, Field::Week);
    let model_col = resolve_first(headers, &[Field::TransformedModel, Field::Model]);
    let qty_col = resolve_field(headers, Field::Qty);

    let mut missing = Vec::new();
    if year_col.is_none() {
        missing.push("YEAR");
    }
    if week_col.is_none() {
        missing.push("WEEK");
    }
    if model_col.is_none() {
        missing.push("변환 Model Name");
    }
    if qty_col.is_none() {
        missing.push("QTY");
    }
    if !missing.is_empty() {
        return Err(ImportError::MissingHeaders {
            sheet: sheet.name.clone(),
            missing: missing.join(", "),
        });
    }

    let dist_col = resolve_field(headers, Field::Distributor);
    let chipset_col = resolve_first(headers, &[Field::Chipset, Field::ItemGroup]);
    let product_col = resolve_field(headers, Field::Product);

    // --- 패스 1: 최신 (연도, 주차) 탐색 ---
    let mut max_year = 0i32;
    let mut max_week = 0i32;
    for row in &sheet.rows {
        let y = parse_number(row.get_or_empty(year_col)) as i32;
        let w = parse_week_number(row.get_or_empty(week_col));
        if y > max_year {
            max_year = y;
            max_week = w;
        } else if y == max_year && w > max_week {
            max_week = w;
        }
    }

    if max_year == 0 {
        return Ok(SnapshotBuild {
            entries: Vec::new(),
            reference_week: None,
        });
    }

    let reference_week = format!("{}-W{:02}", max_year, max_week);

    // --- 패스 2: 최신 주차 행만 수집 ---
    let mut entries = Vec::new();
    let mut total_stock = 0.0;
    for row in &sheet.rows {
        let y = parse_number(row.get_or_empty(year_col)) as i32;
        let w = parse_week_number(row.get_or_empty(week_col));
        if y != max_year || w != max_week {
            continue;
        }
        let Some(model) = row.get_or_empty(model_col).as_trimmed_text() else {
            continue;
        };
        let qty = parse_number(row.get_or_empty(qty_col));
        let distributor = row
            .get_or_empty(dist_col)
            .as_trimmed_text()
            .unwrap_or_else(|| UNKNOWN.to_string());
        let chipset = row
            .get_or_empty(chipset_col)
            .as_trimmed_text()
            .unwrap_or_else(|| UNKNOWN.to_string());
        let product = row.get_or_empty(product_col).as_trimmed_text();

        total_stock += qty;
        entries.push(SnapshotEntry {
            model_name: model,
            chipset,
            distributor,
            product,
            available_stock: qty,
            total_stock: qty,
            incoming_qty: 0.0,
            incoming_amount: 0.0,
            po_qty: 0.0,
            otw_qty: 0.0,
        });
    }

    debug!(
        sheet = %sheet.name,
        reference_week = %reference_week,
        entries = entries.len(),
        total_stock = total_stock,
        "재고 스냅샷 수집 완료"
    );

    Ok(SnapshotBuild {
        entries,
        reference_week: Some(reference_week),
    })
}

// ==========================================
// 백로그 시트 (PO / OTW)
// ==========================================

/// 정규화 모델 키별 백로그 합계
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklogTotals {
    /// 표시용 원본 모델명 (첫 등장 행 기준, `_A` 접미사 제거)
    pub display_name: String,
    pub po_qty: f64,
    pub otw_qty: f64,
}

/// OTW로 집계되는 상태값 (선적됨/통관중/수입신고)
const OTW_STATUSES: [&str; 3] = ["선적", "통관", "수입신고"];

/// 병합 셀 전진 채움: 빈 모델 셀은 직전의 비어있지 않은 값을 물려받는다.
///
/// 원본 스프레드시트가 모델명을 병합 셀로 쓰기 때문에 필요한
/// 명시적 이월 규칙. 반환값은 (적용된 모델명, 갱신된 이월값).
pub fn forward_fill_model(
    cell_text: Option<String>,
    carry: Option<String>,
) -> (Option<String>, Option<String>) {
    match cell_text {
        Some(name) if !name.is_empty() => (Some(name.clone()), Some(name)),
        _ => (carry.clone(), carry),
    }
}

/// 백로그 시트를 정규화 모델 키별 PO/OTW 합계로 변환.
///
/// 상태 버킷: "PO" → po_qty, 선적/통관/수입신고 → otw_qty.
/// 그 외 상태는 조용히 무시한다 (에러 아님).
pub fn build_backlog(sheet: &Sheet) -> BTreeMap<String, BacklogTotals> {
    let headers = &sheet.headers;
    let status_col = resolve_field(headers, Field::Status);
    let model_col = resolve_first(headers, &[Field::TransformedModel, Field::Model]);
    let qty_col = resolve_field(headers, Field::Qty);

    let mut totals: BTreeMap<String, BacklogTotals> = BTreeMap::new();
    let mut carry: Option<String> = None;
    let mut po_sum = 0.0;
    let mut otw_sum = 0.0;

    for row in &sheet.rows {
        let cell_text = row.get_or_empty(model_col).as_trimmed_text();
        let (model, next_carry) = forward_fill_model(cell_text, carry.take());
        carry = next_carry;

        let qty = parse_number(row.get_or_empty(qty_col));
        let Some(model) = model else {
            continue;
        };
        if qty <= 0.0 {
            continue;
        }

        // 모델명 통합: 뒤의 _A 변형 접미사 제거
        let model = model.strip_suffix("_A").unwrap_or(&model).to_string();
        let key = normalize_model_key(&model);

        let status = row
            .get_or_empty(status_col)
            .as_trimmed_text()
            .unwrap_or_default()
            .to_uppercase();

        let entry = totals.entry(key).or_insert_with(|| BacklogTotals {
            display_name: model.clone(),
            ..Default::default()
        });

        if status == "PO" {
            entry.po_qty += qty;
            po_sum += qty;
        } else if OTW_STATUSES.contains(&status.as_str()) {
            entry.otw_qty += qty;
            otw_sum += qty;
        }
        // 그 외 상태는 무시
    }

    // 어느 버킷에도 들어가지 못한 키 제거 (전부 무시 상태였던 모델)
    totals.retain(|_, t| t.po_qty > 0.0 || t.otw_qty > 0.0);

    debug!(sheet = %sheet.name, po = po_sum, otw = otw_sum, models = totals.len(), "백로그 집계 완료");
    totals
}

/// 백로그 합계를 스냅샷에 병합한다.
///
/// 정규화 모델 키로 대응시키고, 재고 시트에 없는 백로그 전용 모델은
/// 재고 0의 엔트리로 추가한다. 키 정규화로 서로 다른 모델이 충돌할 수
/// 있는 위험은 원 시스템과 동일하게 감수한다.
pub fn merge_backlog_into_snapshot(
    snapshot: &mut Vec<SnapshotEntry>,
    mut backlog: BTreeMap<String, BacklogTotals>,
) {
    for entry in snapshot.iter_mut() {
        let key = normalize_model_key(&entry.model_name);
        if let Some(totals) = backlog.remove(&key) {
            entry.po_qty = totals.po_qty;
            entry.otw_qty = totals.otw_qty;
        }
    }

    // 재고에 없는 백로그 모델 → 재고 0 엔트리로 추가
    for (_, totals) in backlog {
        let mut entry = SnapshotEntry::empty(totals.display_name.clone());
        entry.po_qty = totals.po_qty;
        entry.otw_qty = totals.otw_qty;
        snapshot.push(entry);
    }
}
