// ==========================================
// 판매/재고 분석 대시보드 - 업로드 수집 오케스트레이션
// ==========================================
// 흐름: 파싱 → 시트 분류 → 레코드 빌드 → 백로그 병합
// 규칙: 시트/파일 단위 실패는 경고로 기록하고 계속 진행한다.
//       업로드 전체가 실패하는 것은 파일 자체를 못 읽을 때뿐.
// ==========================================

use crate::domain::record::{MarketItem, SnapshotEntry, WeeklyRecord};
use crate::domain::types::{MarketCategory, RecordKind, UNKNOWN};
use crate::importer::cell::Sheet;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalize::parse_date_from_filename;
use crate::importer::record_builder::{
    build_backlog, build_sales_records, build_snapshot, build_weekly_grid_records,
    merge_backlog_into_snapshot, BacklogTotals,
};
use crate::importer::sheet_classifier::{category_from_filename, classify, sheets_of_kind, SheetKind};
use crate::importer::workbook::parse_workbook;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// 결과 타입
// ==========================================

/// 판매/재고 워크북 1개의 수집 결과
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub weekly: Vec<WeeklyRecord>,
    pub snapshot: Vec<SnapshotEntry>,
    /// 재고 시트에서 탐지한 기준 주차 ("2026-W01"). 미탐지 시 "Unknown".
    pub reference_week: String,
    /// 비치명 경고 (헤더 누락으로 건너뛴 시트 등)
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Error,
}

/// 파일 단위 업로드 결과 (화면의 업로드 결과 목록에 대응)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub name: String,
    pub status: UploadStatus,
    pub msg: String,
}

/// 시장 가격 파일 묶음의 수집 결과: 날짜별 배치 + 파일별 결과
#[derive(Debug, Clone, Default)]
pub struct MarketIngest {
    pub batches: BTreeMap<String, Vec<MarketItem>>,
    pub results: Vec<UploadOutcome>,
}

// ==========================================
// IngestService - 수집 오케스트레이터
// ==========================================
pub struct IngestService;

impl IngestService {
    pub fn new() -> Self {
        Self
    }

    /// 판매/재고 워크북 수집.
    ///
    /// 판매 시트는 전부 합치고, 재고 시트에서 스냅샷(최신 주차)을,
    /// 백로그 시트에서 PO/OTW를 뽑아 스냅샷에 병합한다.
    #[instrument(skip(self, bytes, filename), fields(filename = %filename))]
    pub fn ingest_workbook(&self, bytes: &[u8], filename: &str) -> ImportResult<ParsedUpload> {
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, size = bytes.len(), "업로드 수집 시작");

        let workbook = parse_workbook(bytes, filename)?;
        debug!(sheets = workbook.sheets.len(), "워크북 파싱 완료");

        let mut weekly: Vec<WeeklyRecord> = Vec::new();
        let mut snapshot: Vec<SnapshotEntry> = Vec::new();
        let mut reference_week = UNKNOWN.to_string();
        let mut warnings: Vec<String> = Vec::new();
        let mut snapshot_taken = false;

        for sheet in &workbook.sheets {
            match classify(&sheet.name) {
                Some(SheetKind::Sales) => {
                    self.collect_sales_sheet(sheet, &mut weekly, &mut warnings);
                }
                Some(SheetKind::Inventory) => {
                    // 첫 재고 시트에서 스냅샷 시도, 이후/실패 시트는 재고 흐름으로
                    if !snapshot_taken {
                        match build_snapshot(sheet) {
                            Ok(build) if build.reference_week.is_some() => {
                                if let Some(week) = build.reference_week {
                                    reference_week = week;
                                }
                                snapshot = build.entries;
                                snapshot_taken = true;
                                continue;
                            }
                            Ok(_) => {
                                warn!(sheet = %sheet.name, "재고 시트에 주차 데이터 없음");
                            }
                            Err(e) => {
                                warn!(sheet = %sheet.name, error = %e, "스냅샷 헤더 불일치, 재고 흐름으로 처리");
                            }
                        }
                    }
                    weekly.extend(build_weekly_grid_records(sheet, RecordKind::Inventory));
                }
                Some(SheetKind::Backlog) | None => {
                    // 백로그는 아래에서 일괄 처리, 미분류 시트는 무시
                }
            }
        }

        // 백로그 시트 전체 집계 후 스냅샷에 병합
        let mut backlog: BTreeMap<String, BacklogTotals> = BTreeMap::new();
        for sheet in sheets_of_kind(&workbook.sheets, SheetKind::Backlog) {
            for (key, totals) in build_backlog(sheet) {
                let entry = backlog.entry(key).or_insert_with(|| BacklogTotals {
                    display_name: totals.display_name.clone(),
                    ..Default::default()
                });
                entry.po_qty += totals.po_qty;
                entry.otw_qty += totals.otw_qty;
            }
        }
        if !backlog.is_empty() {
            merge_backlog_into_snapshot(&mut snapshot, backlog);
        }

        info!(
            batch_id = %batch_id,
            weekly = weekly.len(),
            snapshot = snapshot.len(),
            reference_week = %reference_week,
            warnings = warnings.len(),
            "업로드 수집 완료"
        );

        Ok(ParsedUpload {
            weekly,
            snapshot,
            reference_week,
            warnings,
        })
    }

    /// 판매 시트 1장 처리: Invoice Date 레이아웃 우선,
    /// 없으면 연도/주차 그리드 레이아웃으로 시도.
    fn collect_sales_sheet(
        &self,
        sheet: &Sheet,
        weekly: &mut Vec<WeeklyRecord>,
        warnings: &mut Vec<String>,
    ) {
        match build_sales_records(sheet) {
            Ok(records) => weekly.extend(records),
            Err(ImportError::MissingHeaders { .. }) => {
                let records = build_weekly_grid_records(sheet, RecordKind::Sales);
                if records.is_empty() {
                    let msg = format!(
                        "시트 건너뜀 ({}): 필수 헤더 없음 (Invoice Date, 변환 Model Name, QTY)",
                        sheet.name
                    );
                    warn!("{}", msg);
                    warnings.push(msg);
                } else {
                    weekly.extend(records);
                }
            }
            Err(e) => {
                let msg = format!("시트 처리 실패 ({}): {}", sheet.name, e);
                warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    /// 시장 가격 파일 묶음 수집.
    ///
    /// 파일별로 카테고리(파일명)와 기준 날짜(파일명 → fallback → today)를
    /// 정한 뒤 같은 날짜의 항목끼리 배치로 모은다. 개별 파일 실패는
    /// 결과 목록에 에러로 남기고 계속 진행한다.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub fn ingest_market_files(
        &self,
        files: &[(String, Vec<u8>)],
        fallback_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> MarketIngest {
        let mut ingest = MarketIngest::default();

        for (name, bytes) in files {
            match self.ingest_market_file(name, bytes, fallback_date, today) {
                Ok((date, items)) => {
                    let msg = format!("{}건 파싱 ({})", items.len(), date);
                    ingest.batches.entry(date).or_default().extend(items);
                    ingest.results.push(UploadOutcome {
                        name: name.clone(),
                        status: UploadStatus::Success,
                        msg,
                    });
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "가격 파일 처리 실패");
                    ingest.results.push(UploadOutcome {
                        name: name.clone(),
                        status: UploadStatus::Error,
                        msg: e.to_string(),
                    });
                }
            }
        }

        info!(
            dates = ingest.batches.len(),
            files = ingest.results.len(),
            "시장 가격 수집 완료"
        );
        ingest
    }

    fn ingest_market_file(
        &self,
        name: &str,
        bytes: &[u8],
        fallback_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> ImportResult<(String, Vec<MarketItem>)> {
        let category = category_from_filename(name);
        if category == MarketCategory::Unknown {
            return Err(ImportError::UnknownCategory(name.to_string()));
        }

        let target_date = parse_date_from_filename(name, fallback_date, today);
        let workbook = parse_workbook(bytes, name)?;
        let sheet = workbook
            .sheets
            .first()
            .ok_or_else(|| ImportError::EmptyWorkbook(name.to_string()))?;

        let items = crate::importer::market_builder::build_market_items(sheet, category)?;
        if items.is_empty() {
            return Err(ImportError::InternalError(format!(
                "유효한 행 없음: {}",
                name
            )));
        }

        Ok((target_date, items))
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(name: &str, content: &str) -> (String, Vec<u8>) {
        (name.to_string(), content.as_bytes().to_vec())
    }

    #[test]
    fn test_ingest_sales_csv_end_to_end() {
        let service = IngestService::new();
        let data = "Invoice Date,변환 Model Name,QTY,업체명\n2024-01-05,RTX4070,10,A\n";
        let parsed = service
            .ingest_workbook(data.as_bytes(), "sell-out raw.csv")
            .unwrap();

        assert_eq!(parsed.weekly.len(), 1);
        let rec = &parsed.weekly[0];
        assert_eq!(rec.date, "2024-01-05");
        assert_eq!(rec.qty, 10.0);
        assert_eq!(rec.model_name, "RTX4070");
        assert_eq!(rec.distributor, "A");
        assert_eq!(rec.status, crate::domain::types::STATUS_VALID);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.reference_week, UNKNOWN);
    }

    #[test]
    fn test_ingest_unclassified_sheet_ignored() {
        let service = IngestService::new();
        let data = "Col1,Col2\na,b\n";
        let parsed = service.ingest_workbook(data.as_bytes(), "요약.csv").unwrap();
        assert!(parsed.weekly.is_empty());
        assert!(parsed.snapshot.is_empty());
    }

    #[test]
    fn test_ingest_inventory_snapshot_csv() {
        let service = IngestService::new();
        let data = "YEAR,주차,변환 Model Name,QTY,업체명\n2024,W03,RTX4070,100,A\n2024,W04,RTX4070,80,A\n";
        let parsed = service
            .ingest_workbook(data.as_bytes(), "inventory.csv")
            .unwrap();
        assert_eq!(parsed.reference_week, "2024-W04");
        assert_eq!(parsed.snapshot.len(), 1);
        assert_eq!(parsed.snapshot[0].available_stock, 80.0);
    }

    #[test]
    fn test_market_ingest_unknown_category_is_nonfatal() {
        let service = IngestService::new();
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let files = vec![
            csv("가격표.csv", "Model,Price\nX,1\n"),
            csv(
                "vga_20240105.csv",
                "Brand,Model,Price\nMSI,RTX4070,1234000\n",
            ),
        ];
        let ingest = service.ingest_market_files(&files, None, today);

        assert_eq!(ingest.results.len(), 2);
        assert_eq!(ingest.results[0].status, UploadStatus::Error);
        assert_eq!(ingest.results[1].status, UploadStatus::Success);
        assert_eq!(ingest.batches.len(), 1);
        let items = ingest.batches.get("2024-01-05").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].brand, "MSI");
    }
}
