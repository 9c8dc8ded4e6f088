// ==========================================
// 판매/재고 분석 대시보드 - 조회 필터
// ==========================================
// 계약: 모든 조건은 선택적 집합 멤버십. 빈 목록 = 전체 매칭.
// 날짜: "YYYY-MM-DD" 키의 사전식 비교. MISSING_DATE는
//       날짜 범위가 걸린 조회에서 항상 제외된다.
// ==========================================

use crate::domain::record::{MarketItem, WeeklyRecord};
use crate::domain::types::MISSING_DATE;

// ==========================================
// RecordFilter - 판매/재고 레코드 필터
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// (시작일, 종료일) 포함 범위. None이면 전체 기간.
    pub date_range: Option<(String, String)>,
    pub distributors: Vec<String>,
    pub models: Vec<String>,
    pub chipsets: Vec<String>,
    pub category_types: Vec<String>,
    pub dealers: Vec<String>,
    pub products: Vec<String>,
}

fn member(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|v| v == value)
}

impl RecordFilter {
    /// 날짜 범위 + 전체 차원 매칭
    pub fn matches(&self, record: &WeeklyRecord) -> bool {
        self.date_in_range(&record.date) && self.matches_dimensions(record)
    }

    /// 차원 조건만 매칭 (런레이트 엔진은 자체 추적 윈도를 쓰므로
    /// 날짜 범위를 무시하고 이 메서드를 쓴다)
    pub fn matches_dimensions(&self, record: &WeeklyRecord) -> bool {
        member(&self.distributors, &record.distributor)
            && member(&self.models, &record.model_name)
            && member(&self.chipsets, &record.chipset)
            && member(&self.category_types, &record.category_type)
            && member(&self.dealers, &record.dealer_name)
            && member(&self.products, &record.product)
    }

    /// 총판 조건만 제외한 차원 매칭 (추세 비교 시리즈용 -
    /// 비교 대상 총판은 호출 측에서 별도로 건다)
    pub fn matches_shared_dimensions(&self, record: &WeeklyRecord) -> bool {
        member(&self.models, &record.model_name)
            && member(&self.chipsets, &record.chipset)
            && member(&self.category_types, &record.category_type)
            && member(&self.dealers, &record.dealer_name)
            && member(&self.products, &record.product)
    }

    pub fn date_in_range(&self, date: &str) -> bool {
        match &self.date_range {
            None => true,
            Some((start, end)) => {
                if date.is_empty() || date == MISSING_DATE {
                    return false;
                }
                date >= start.as_str() && date <= end.as_str()
            }
        }
    }
}

// ==========================================
// MarketFilter - 시장 가격 필터
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MarketFilter {
    /// None이면 전체 카테고리
    pub category: Option<String>,
    pub brands: Vec<String>,
    /// spec 필드(칩셋/규격) 멤버십
    pub chipsets: Vec<String>,
    pub models: Vec<String>,
}

impl MarketFilter {
    pub fn matches(&self, item: &MarketItem) -> bool {
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }
        member(&self.brands, &item.brand)
            && (self.chipsets.is_empty()
                || (!item.spec.is_empty() && self.chipsets.iter().any(|c| c == &item.spec)))
            && member(&self.models, &item.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordKind;

    fn record(date: &str, distributor: &str, model: &str) -> WeeklyRecord {
        WeeklyRecord {
            id: String::new(),
            distributor: distributor.to_string(),
            model_name: model.to_string(),
            chipset: "Unknown".to_string(),
            category_type: "Unknown".to_string(),
            dealer_name: "Unknown".to_string(),
            product: "Unknown".to_string(),
            qty: 1.0,
            year: 2024,
            month: 1,
            week: 1,
            date: date.to_string(),
            kind: RecordKind::Sales,
            status: String::new(),
            row_index: 2,
            raw_date: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("2024-01-05", "A", "RTX4070")));
        assert!(filter.matches(&record(MISSING_DATE, "B", "RTX4080")));
    }

    #[test]
    fn test_date_range_excludes_missing_date() {
        let filter = RecordFilter {
            date_range: Some(("2024-01-01".to_string(), "2024-12-31".to_string())),
            ..Default::default()
        };
        assert!(filter.matches(&record("2024-06-15", "A", "M")));
        assert!(!filter.matches(&record("2023-12-31", "A", "M")));
        assert!(!filter.matches(&record(MISSING_DATE, "A", "M")));
    }

    #[test]
    fn test_dimension_membership() {
        let filter = RecordFilter {
            distributors: vec!["A".to_string()],
            models: vec!["RTX4070".to_string()],
            ..Default::default()
        };
        assert!(filter.matches(&record("2024-01-05", "A", "RTX4070")));
        assert!(!filter.matches(&record("2024-01-05", "B", "RTX4070")));
        assert!(!filter.matches(&record("2024-01-05", "A", "RTX4080")));
    }

    #[test]
    fn test_shared_dimensions_ignore_distributor() {
        let filter = RecordFilter {
            distributors: vec!["A".to_string()],
            models: vec!["RTX4070".to_string()],
            ..Default::default()
        };
        assert!(filter.matches_shared_dimensions(&record("2024-01-05", "B", "RTX4070")));
    }

    #[test]
    fn test_market_filter() {
        let item = MarketItem {
            category: "VGA".to_string(),
            brand: "MSI".to_string(),
            model: "RTX4070 Ventus".to_string(),
            spec: "RTX4070".to_string(),
            price: 1000.0,
            product_url: None,
        };
        let mut filter = MarketFilter {
            category: Some("VGA".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item));

        filter.chipsets = vec!["RTX4080".to_string()];
        assert!(!filter.matches(&item));

        filter.chipsets = vec!["RTX4070".to_string()];
        filter.brands = vec!["MSI".to_string()];
        assert!(filter.matches(&item));

        filter.category = Some("CPU".to_string());
        assert!(!filter.matches(&item));
    }
}
