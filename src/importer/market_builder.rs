// ==========================================
// 판매/재고 분석 대시보드 - 시장 가격 빌더
// ==========================================
// 용도: 시장 가격표 워크북(첫 시트)을 MarketItem 목록으로 변환
// 스펙 열 우선순위: 칩셋 → 규격(SPEC) → WATT → VERSION
// (PSU 카테고리는 와트/버전 열만 있는 경우가 많음)
// ==========================================

use crate::domain::record::MarketItem;
use crate::domain::types::{MarketCategory, UNKNOWN};
use crate::importer::cell::Sheet;
use crate::importer::column_resolver::{resolve_field, resolve_first, Field};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalize::parse_number;
use tracing::debug;

/// 가격표 시트 1장을 MarketItem 목록으로 변환.
///
/// 모델/가격 열이 없으면 MissingHeaders. 모델 값이 빈 행은 건너뛴다.
pub fn build_market_items(
    sheet: &Sheet,
    category: MarketCategory,
) -> ImportResult<Vec<MarketItem>> {
    let headers = &sheet.headers;
    let model_col = resolve_field(headers, Field::Model);
    let price_col = resolve_field(headers, Field::Price);

    let (Some(model_col), Some(price_col)) = (model_col, price_col) else {
        let mut missing = Vec::new();
        if model_col.is_none() {
            missing.push("MODEL");
        }
        if price_col.is_none() {
            missing.push("PRICE");
        }
        return Err(ImportError::MissingHeaders {
            sheet: sheet.name.clone(),
            missing: missing.join(", "),
        });
    };

    let brand_col = resolve_field(headers, Field::Brand);
    // 스펙 열은 우선순위 체인의 첫 매칭을 쓴다
    let spec_col = resolve_first(headers, &[Field::Chipset, Field::Spec, Field::Watt, Field::Version]);
    let url_col = resolve_field(headers, Field::Url);

    let mut items = Vec::new();
    for row in &sheet.rows {
        let Some(model) = row.get_or_empty(Some(model_col)).as_trimmed_text() else {
            continue;
        };
        let price = parse_number(row.get_or_empty(Some(price_col)));
        let brand = row
            .get_or_empty(brand_col)
            .as_trimmed_text()
            .unwrap_or_else(|| UNKNOWN.to_string());
        let spec = row
            .get_or_empty(spec_col)
            .as_trimmed_text()
            .unwrap_or_default();
        let product_url = row.get_or_empty(url_col).as_trimmed_text();

        items.push(MarketItem {
            category: category.as_str().to_string(),
            brand,
            model,
            spec,
            price,
            product_url,
        });
    }

    debug!(sheet = %sheet.name, category = %category, items = items.len(), "가격표 변환 완료");
    Ok(items)
}
