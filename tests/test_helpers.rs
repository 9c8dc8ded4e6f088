// ==========================================
// 판매/재고 분석 대시보드 - 테스트 헬퍼
// ==========================================
// 용도: 통합 테스트 공용 레코드/스냅샷 생성기
// ==========================================

use sellout_dashboard::domain::types::{RecordKind, STATUS_VALID, UNKNOWN};
use sellout_dashboard::domain::{SnapshotEntry, WeeklyRecord};

/// 판매 레코드 생성 (date는 "YYYY-MM-DD")
pub fn sales_record(id: &str, date: &str, distributor: &str, model: &str, qty: f64) -> WeeklyRecord {
    let (year, week) = match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => {
            use chrono::Datelike;
            (d.iso_week().year(), d.iso_week().week() as i32)
        }
        Err(_) => (0, 0),
    };
    WeeklyRecord {
        id: id.to_string(),
        distributor: distributor.to_string(),
        model_name: model.to_string(),
        chipset: UNKNOWN.to_string(),
        category_type: UNKNOWN.to_string(),
        dealer_name: UNKNOWN.to_string(),
        product: UNKNOWN.to_string(),
        qty,
        year,
        month: 1,
        week,
        date: date.to_string(),
        kind: RecordKind::Sales,
        status: STATUS_VALID.to_string(),
        row_index: 2,
        raw_date: None,
    }
}

/// 스냅샷 엔트리 생성
pub fn snapshot_entry(distributor: &str, model: &str, stock: f64, po: f64, otw: f64) -> SnapshotEntry {
    SnapshotEntry {
        model_name: model.to_string(),
        chipset: UNKNOWN.to_string(),
        distributor: distributor.to_string(),
        product: None,
        available_stock: stock,
        total_stock: stock,
        incoming_qty: 0.0,
        incoming_amount: 0.0,
        po_qty: po,
        otw_qty: otw,
    }
}
