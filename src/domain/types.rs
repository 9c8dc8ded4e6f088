// ==========================================
// 판매/재고 분석 대시보드 - 공통 타입 정의
// ==========================================
// 용도: 레코드 종류 / ISO 주차 / 시장 카테고리 / 센티널 상수
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// RecordKind - 주간 레코드 데이터 타입
// ==========================================
// 저장 문서의 type 필드와 1:1 대응 ("sales" / "inventory")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Sales,     // 판매 (Sell-out)
    Inventory, // 재고 흐름
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Sales => "sales",
            RecordKind::Inventory => "inventory",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// IsoWeek - ISO-8601 연도/주차 쌍
// ==========================================
// 주의: ISO 주차 연도는 달력 연도와 다를 수 있음 (연말/연초 경계)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// "2026-W01" 형식 라벨
    pub fn label(&self) -> String {
        format!("{}-W{:02}", self.year, self.week)
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

// ==========================================
// MarketCategory - 시장 가격 파일 카테고리
// ==========================================
// 업로드 파일명에서 판별 (sheet_classifier::category_from_filename)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCategory {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "PSU")]
    Psu,
    #[serde(rename = "MB")]
    Mb,
    #[serde(rename = "VGA")]
    Vga,
    #[serde(rename = "RAM")]
    Ram,
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "OS")]
    Os,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl MarketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCategory::Cpu => "CPU",
            MarketCategory::Psu => "PSU",
            MarketCategory::Mb => "MB",
            MarketCategory::Vga => "VGA",
            MarketCategory::Ram => "RAM",
            MarketCategory::Ssd => "SSD",
            MarketCategory::Os => "OS",
            MarketCategory::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 센티널 상수
// ==========================================

/// 원본에서 찾지 못한 차원 필드의 값
pub const UNKNOWN: &str = "Unknown";

/// 날짜 변환 실패 시 date 필드에 저장되는 센티널
pub const MISSING_DATE: &str = "MISSING_DATE";

/// 행 진단 상태: 정상
pub const STATUS_VALID: &str = "정상 (Valid)";

/// 행 진단 상태: 수량 0
pub const STATUS_ZERO_QTY: &str = "수량 0 (Zero Qty)";

/// 행 진단 상태: 모델명 없음
pub const STATUS_NO_MODEL: &str = "모델명 없음";

/// WOS 센티널: 소비 없이 재고만 있는 경우 (무한대 대신 정렬 가능한 값)
pub const WOS_INFINITE: f64 = 999.0;
