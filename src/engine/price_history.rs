// ==========================================
// 판매/재고 분석 대시보드 - 시장 가격 이력 엔진
// ==========================================
// 입력: 날짜 오름차순 MarketHistory[] + 필터
// 출력: (브랜드, 모델)별 최신가 테이블, 전일 대비 등락 TOP 10,
//       브랜드 평균가 / 브랜드 추세
// ==========================================

use crate::domain::record::MarketHistory;
use crate::engine::filter::MarketFilter;
use serde::Serialize;
use std::collections::BTreeMap;

// ==========================================
// 최신가 테이블
// ==========================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPriceRow {
    pub brand: String,
    pub model: String,
    pub spec: String,
    pub price: f64,
    /// 이 가격이 관측된 마지막 날짜
    pub date: String,
}

/// (브랜드, 모델)별 마지막으로 알려진 가격.
///
/// 날짜 오름차순으로 걸으며 같은 키를 덮어쓰므로 최신 관측이 남는다.
/// 정렬: 관측일 내림차순, 같은 날짜면 브랜드 오름차순.
pub fn latest_price_table(history: &[MarketHistory], filter: &MarketFilter) -> Vec<LatestPriceRow> {
    let mut latest: BTreeMap<(String, String), LatestPriceRow> = BTreeMap::new();

    for entry in history {
        for item in &entry.items {
            if !filter.matches(item) {
                continue;
            }
            latest.insert(
                (item.brand.clone(), item.model.clone()),
                LatestPriceRow {
                    brand: item.brand.clone(),
                    model: item.model.clone(),
                    spec: item.spec.clone(),
                    price: item.price,
                    date: entry.date.clone(),
                },
            );
        }
    }

    let mut rows: Vec<LatestPriceRow> = latest.into_values().collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.brand.cmp(&b.brand)));
    rows
}

// ==========================================
// 전일 대비 등락 (Gainers / Losers)
// ==========================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMover {
    pub brand: String,
    pub model: String,
    pub old_price: f64,
    pub new_price: f64,
    pub diff: f64,
    pub pct: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMovers {
    /// 상승률 내림차순 TOP 10
    pub gainers: Vec<PriceMover>,
    /// 상승률 오름차순 TOP 10 (하락폭 큰 순)
    pub losers: Vec<PriceMover>,
}

const TOP_N: usize = 10;

/// 최신 날짜 대비 등락 계산.
///
/// 비교 기준은 제품별이다: 전역 최신 날짜의 각 항목에 대해, 같은
/// (카테고리, 브랜드, 모델)이 존재하는 직전 날짜를 거슬러 찾아 그
/// 가격과 비교한다. 변동 0과 어느 한쪽 가격이 0 이하인 쌍은 제외.
/// 최신 날짜에 없는 제품은 "현재"가 아니므로 양쪽 목록에서 빠진다.
pub fn price_movers(history: &[MarketHistory], filter: &MarketFilter) -> PriceMovers {
    if history.len() < 2 {
        return PriceMovers::default();
    }

    // load()가 오름차순을 보장하지만 방어적으로 최신 엔트리를 찾는다
    let latest = match history.iter().max_by(|a, b| a.date.cmp(&b.date)) {
        Some(entry) => entry,
        None => return PriceMovers::default(),
    };
    let mut earlier: Vec<&MarketHistory> = history
        .iter()
        .filter(|h| h.date < latest.date)
        .collect();
    earlier.sort_by(|a, b| b.date.cmp(&a.date)); // 최신 → 과거 순

    let mut diffs: Vec<PriceMover> = Vec::new();
    for item in &latest.items {
        if !filter.matches(item) {
            continue;
        }
        if item.price <= 0.0 {
            continue;
        }

        // 같은 제품이 나오는 가장 가까운 과거 날짜 탐색
        let previous = earlier.iter().find_map(|h| {
            h.items.iter().find(|prev| {
                prev.model == item.model
                    && prev.brand == item.brand
                    && prev.category == item.category
            })
        });
        let Some(previous) = previous else {
            continue;
        };
        if previous.price <= 0.0 {
            continue;
        }

        let diff = item.price - previous.price;
        if diff == 0.0 {
            continue;
        }
        diffs.push(PriceMover {
            brand: item.brand.clone(),
            model: item.model.clone(),
            old_price: previous.price,
            new_price: item.price,
            diff,
            pct: diff / previous.price * 100.0,
        });
    }

    let mut gainers = diffs.clone();
    gainers.sort_by(|a, b| b.pct.partial_cmp(&a.pct).unwrap_or(std::cmp::Ordering::Equal));
    gainers.truncate(TOP_N);

    let mut losers = diffs;
    losers.sort_by(|a, b| a.pct.partial_cmp(&b.pct).unwrap_or(std::cmp::Ordering::Equal));
    losers.truncate(TOP_N);

    PriceMovers { gainers, losers }
}

// ==========================================
// 브랜드 평균가 / 추세
// ==========================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAverage {
    pub brand: String,
    pub avg_price: f64, // 반올림된 평균
}

/// 최신 날짜 기준 브랜드별 평균가 (평균가 내림차순).
pub fn brand_average(history: &[MarketHistory], filter: &MarketFilter) -> Vec<BrandAverage> {
    let Some(latest) = history.last() else {
        return Vec::new();
    };

    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for item in &latest.items {
        if !filter.matches(item) {
            continue;
        }
        let entry = sums.entry(item.brand.clone()).or_insert((0.0, 0));
        entry.0 += item.price;
        entry.1 += 1;
    }

    let mut averages: Vec<BrandAverage> = sums
        .into_iter()
        .map(|(brand, (total, count))| BrandAverage {
            brand,
            avg_price: (total / count as f64).round(),
        })
        .collect();
    averages.sort_by(|a, b| {
        b.avg_price
            .partial_cmp(&a.avg_price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    averages
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandTrendPoint {
    pub date: String,
    /// 브랜드명 → 그 날짜의 평균가 (브랜드명 오름차순)
    pub averages: Vec<(String, f64)>,
}

/// 날짜별 브랜드 평균가 추세 (날짜 오름차순).
/// 필터에 걸리는 항목이 없는 날짜는 빈 averages로 포함된다.
pub fn brand_trend(history: &[MarketHistory], filter: &MarketFilter) -> Vec<BrandTrendPoint> {
    history
        .iter()
        .map(|entry| {
            let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
            for item in &entry.items {
                if !filter.matches(item) {
                    continue;
                }
                let acc = sums.entry(item.brand.clone()).or_insert((0.0, 0));
                acc.0 += item.price;
                acc.1 += 1;
            }
            BrandTrendPoint {
                date: entry.date.clone(),
                averages: sums
                    .into_iter()
                    .map(|(brand, (total, count))| (brand, (total / count as f64).round()))
                    .collect(),
            }
        })
        .collect()
}
