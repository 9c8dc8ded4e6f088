// ==========================================
// 판매/재고 분석 대시보드 - 레코드 도메인 모델
// ==========================================
// 용도: 업로드 파싱 결과 및 저장 문서의 정식 형태
// 정합: 저장 JSON 문서와 camelCase 필드명 1:1 대응
// ==========================================

use crate::domain::types::{RecordKind, UNKNOWN};
use serde::{Deserialize, Serialize};

// ==========================================
// WeeklyRecord - 판매/재고 흐름 관측 1건
// ==========================================
// 불변 규칙: 생성 후 수정하지 않음. 동일 id의 레코드가
// 이후 업로드에서 들어오면 병합 엔진이 통째로 대체한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecord {
    /// 고유 ID: `ROW_<행번호>_<날짜|MISSING_DATE>_<정규화모델명>`
    #[serde(default)]
    pub id: String,

    // ===== 차원 필드 (미검출 시 "Unknown") =====
    pub distributor: String,   // 총판 (DISTISUBNAME / 업체명)
    pub model_name: String,    // 모델명 (변환 Model Name)
    pub chipset: String,       // 칩셋
    #[serde(default = "unknown_string")]
    pub category_type: String, // 구분 (B2B/B2C 등)
    #[serde(default = "unknown_string")]
    pub dealer_name: String,   // 판매처 (Dealer)
    #[serde(default = "unknown_string")]
    pub product: String,       // 품목 (Product)

    // ===== 측정값 =====
    pub qty: f64, // 수량 (파싱 실패/누락 → 0)

    // ===== 시간 차원 =====
    pub year: i32,
    #[serde(default)]
    pub month: i32, // 월. 누락 시 week에서 ceil(week/4.35)로 근사
    pub week: i32,  // ISO 주차
    /// 실제 판매 날짜 "YYYY-MM-DD" 또는 "MISSING_DATE"
    #[serde(default)]
    pub date: String,

    /// 데이터 타입 (sales | inventory)
    #[serde(rename = "type")]
    pub kind: RecordKind,

    // ===== 진단 필드 (감사/디버깅용, 필터링에는 사용하지 않음) =====
    #[serde(default)]
    pub status: String, // "정상 (Valid)" 또는 누락 사유
    #[serde(default)]
    pub row_index: usize, // 엑셀 행 번호 (헤더 제외, 2부터)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_date: Option<String>, // 원본 날짜 셀 값
}

fn unknown_string() -> String {
    UNKNOWN.to_string()
}

impl WeeklyRecord {
    /// 병합 키. id가 있으면 그대로, 없으면(과거 데이터 호환)
    /// 업무 차원 + 날짜 + 행번호의 복합 키로 대체한다.
    pub fn identity_key(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }
        format!(
            "{}_{}_{}_{}_{}_{}_{}_{}_{}",
            self.year,
            self.week,
            self.distributor,
            self.model_name,
            self.dealer_name,
            self.category_type,
            self.product,
            self.date,
            self.row_index
        )
    }
}

// ==========================================
// SnapshotEntry - 시점 재고/백로그 상태 1건
// ==========================================
// 생명주기: 업로드 성공 시마다 전체 교체 (스냅샷이지 로그가 아님)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub model_name: String,
    #[serde(default = "unknown_string")]
    pub chipset: String,
    #[serde(default = "unknown_string")]
    pub distributor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    // 보유 재고 (현재 파서는 두 필드를 동일 값으로 채움)
    pub available_stock: f64, // 정상가용
    pub total_stock: f64,     // 합계수량

    // 입고예정 (레거시 백로그 금액 필드, 문서 호환 유지)
    #[serde(default)]
    pub incoming_qty: f64,
    #[serde(default)]
    pub incoming_amount: f64,

    // 백로그 시트에서 병합되는 필드
    #[serde(default)]
    pub po_qty: f64,  // PO 수량 (발주, 미선적)
    #[serde(default)]
    pub otw_qty: f64, // OTW 수량 (선적/통관/수입신고)
}

impl SnapshotEntry {
    /// 재고 0의 기본 엔트리 (백로그 전용 모델 등)
    pub fn empty(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            chipset: UNKNOWN.to_string(),
            distributor: UNKNOWN.to_string(),
            product: None,
            available_stock: 0.0,
            total_stock: 0.0,
            incoming_qty: 0.0,
            incoming_amount: 0.0,
            po_qty: 0.0,
            otw_qty: 0.0,
        }
    }

    /// 총 가용 수량 = 재고 + PO + OTW
    pub fn total_available(&self) -> f64 {
        self.available_stock + self.po_qty + self.otw_qty
    }
}

// ==========================================
// MarketItem / MarketHistory - 시장 가격 스냅샷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketItem {
    pub category: String, // CPU, PSU, MB, VGA 등
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub spec: String, // 칩셋/규격/와트 등
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}

/// 달력 날짜 1일당 1건. 같은 날짜 재업로드 시 통째로 교체된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHistory {
    pub date: String, // YYYY-MM-DD
    pub items: Vec<MarketItem>,
}

// ==========================================
// DashboardDocument - 판매/재고 저장 문서
// ==========================================
// 저장소에는 문서 전체를 통으로 읽고/덮어쓴다 (부분 갱신 없음)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDocument {
    #[serde(default)]
    pub weekly_data: Vec<WeeklyRecord>,
    #[serde(default)]
    pub current_snapshot: Vec<SnapshotEntry>,
    /// 예약 필드. 현재 비워서 저장하며 읽을 때 그대로 보존한다.
    #[serde(default)]
    pub analysis_result: Vec<serde_json::Value>,
    #[serde(default)]
    pub reference_week: String,
    #[serde(default)]
    pub updated_at: String, // ISO-8601
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MISSING_DATE;

    fn sample_record() -> WeeklyRecord {
        WeeklyRecord {
            id: "ROW_0_2024-01-05_RTX4070".to_string(),
            distributor: "A".to_string(),
            model_name: "RTX4070".to_string(),
            chipset: UNKNOWN.to_string(),
            category_type: UNKNOWN.to_string(),
            dealer_name: UNKNOWN.to_string(),
            product: UNKNOWN.to_string(),
            qty: 10.0,
            year: 2024,
            month: 1,
            week: 1,
            date: "2024-01-05".to_string(),
            kind: RecordKind::Sales,
            status: crate::domain::types::STATUS_VALID.to_string(),
            row_index: 2,
            raw_date: None,
        }
    }

    #[test]
    fn test_identity_key_prefers_id() {
        let rec = sample_record();
        assert_eq!(rec.identity_key(), "ROW_0_2024-01-05_RTX4070");
    }

    #[test]
    fn test_identity_key_composite_fallback() {
        let mut rec = sample_record();
        rec.id = String::new();
        rec.date = MISSING_DATE.to_string();
        let key = rec.identity_key();
        assert!(key.contains("2024_1_A_RTX4070"));
        assert!(key.ends_with("_2"));
    }

    #[test]
    fn test_document_serde_camel_case() {
        let doc = DashboardDocument {
            weekly_data: vec![sample_record()],
            reference_week: "2024-W01".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"weeklyData\""));
        assert!(json.contains("\"referenceWeek\""));
        assert!(json.contains("\"modelName\""));
        assert!(json.contains("\"type\":\"sales\""));

        let back: DashboardDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.weekly_data.len(), 1);
        assert_eq!(back.weekly_data[0].model_name, "RTX4070");
    }

    #[test]
    fn test_snapshot_total_available() {
        let mut snap = SnapshotEntry::empty("RTX4070");
        snap.available_stock = 10.0;
        snap.po_qty = 5.0;
        snap.otw_qty = 2.0;
        assert_eq!(snap.total_available(), 17.0);
    }
}
