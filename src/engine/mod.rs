// ==========================================
// 판매/재고 분석 대시보드 - 분석 엔진 계층
// ==========================================
// 책임: 병합/런레이트/가격 이력 등 순수 계산
// 규칙: 부수효과 없음. 같은 입력이면 같은 출력 (반복 조회 안전).
// ==========================================

pub mod filter;
pub mod merge;
pub mod price_history;
pub mod run_rate;
pub mod trend;

pub use filter::{MarketFilter, RecordFilter};
pub use merge::merge_weekly;
pub use price_history::{
    brand_average, brand_trend, latest_price_table, price_movers, BrandAverage, BrandTrendPoint,
    LatestPriceRow, PriceMover, PriceMovers,
};
pub use run_rate::{aggregate_by_model, analyze, ModelRollup, RunRateParams, RunRateReport, RunRateRow};
pub use trend::{summarize_by, trend_series, DimensionSummary, SummaryKey, TrendPoint, TrendView};
