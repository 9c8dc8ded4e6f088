// ==========================================
// 판매/재고 분석 대시보드 - 가격 이력 통합 테스트
// ==========================================
// 범위: 파일 수집 → 날짜별 저장 → 등락/최신가 집계
// ==========================================

use sellout_dashboard::engine::{latest_price_table, price_movers, MarketFilter};
use sellout_dashboard::importer::{IngestService, UploadStatus};
use sellout_dashboard::store::{MarketRepository, MemoryBlobStore};

fn csv(name: &str, content: &str) -> (String, Vec<u8>) {
    (name.to_string(), content.as_bytes().to_vec())
}

// ==========================================
// 파일 수집 → 저장 → 등락 계산 끝대끝
// ==========================================

#[tokio::test]
async fn test_market_upload_to_movers_end_to_end() {
    let service = IngestService::new();
    let repo = MarketRepository::new(MemoryBlobStore::new(), "market_price_history.json");
    let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();

    // 이틀치 가격표 업로드 (날짜는 파일명에서)
    let day1 = service.ingest_market_files(
        &[csv(
            "vga_20240105.csv",
            "Brand,Model,Price,Chipset\nMSI,RTX4070 Ventus,1000000,RTX4070\n",
        )],
        None,
        today,
    );
    assert_eq!(day1.results[0].status, UploadStatus::Success);
    for (date, items) in day1.batches {
        repo.save(items, &date).await.unwrap();
    }

    let day2 = service.ingest_market_files(
        &[csv(
            "vga_20240106.csv",
            "Brand,Model,Price,Chipset\nMSI,RTX4070 Ventus,1100000,RTX4070\n",
        )],
        None,
        today,
    );
    for (date, items) in day2.batches {
        repo.save(items, &date).await.unwrap();
    }

    let history = repo.load().await.unwrap();
    assert_eq!(history.len(), 2);

    // 1000000 → 1100000: +10% 상승
    let movers = price_movers(&history, &MarketFilter::default());
    assert_eq!(movers.gainers.len(), 1);
    let gain = &movers.gainers[0];
    assert_eq!(gain.model, "RTX4070 Ventus");
    assert!((gain.pct - 10.0).abs() < 1e-9);
    // 변동 항목이 1건뿐이면 양쪽 목록에 모두 등장한다 (TOP 10 슬라이스)
    assert_eq!(movers.losers.len(), 1);
}

// ==========================================
// 최신 날짜에 없는 제품은 등락 목록에서 제외
// ==========================================

#[tokio::test]
async fn test_stale_product_excluded_from_movers() {
    let repo = MarketRepository::new(MemoryBlobStore::new(), "market_price_history.json");

    let item = |brand: &str, model: &str, price: f64| sellout_dashboard::domain::MarketItem {
        category: "VGA".to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        spec: String::new(),
        price,
        product_url: None,
    };

    repo.save(
        vec![item("MSI", "CURRENT", 1000.0), item("MSI", "STALE", 500.0)],
        "2024-01-05",
    )
    .await
    .unwrap();
    repo.save(
        vec![item("MSI", "CURRENT", 1100.0), item("MSI", "STALE", 450.0)],
        "2024-01-06",
    )
    .await
    .unwrap();
    // 최신 날짜에는 CURRENT만 존재
    repo.save(vec![item("MSI", "CURRENT", 1200.0)], "2024-01-07")
        .await
        .unwrap();

    let history = repo.load().await.unwrap();
    let movers = price_movers(&history, &MarketFilter::default());

    assert!(movers.gainers.iter().any(|m| m.model == "CURRENT"));
    assert!(movers.gainers.iter().all(|m| m.model != "STALE"));
    assert!(movers.losers.iter().all(|m| m.model != "STALE"));

    // 최신가 테이블에는 STALE도 마지막 관측일로 남는다
    let table = latest_price_table(&history, &MarketFilter::default());
    let stale = table.iter().find(|r| r.model == "STALE").unwrap();
    assert_eq!(stale.price, 450.0);
    assert_eq!(stale.date, "2024-01-06");
}

// ==========================================
// 카테고리 필터
// ==========================================

#[tokio::test]
async fn test_movers_respect_category_filter() {
    let repo = MarketRepository::new(MemoryBlobStore::new(), "market_price_history.json");

    let item = |category: &str, model: &str, price: f64| sellout_dashboard::domain::MarketItem {
        category: category.to_string(),
        brand: "MSI".to_string(),
        model: model.to_string(),
        spec: String::new(),
        price,
        product_url: None,
    };

    repo.save(
        vec![item("VGA", "G1", 1000.0), item("CPU", "C1", 300.0)],
        "2024-01-05",
    )
    .await
    .unwrap();
    repo.save(
        vec![item("VGA", "G1", 1100.0), item("CPU", "C1", 330.0)],
        "2024-01-06",
    )
    .await
    .unwrap();

    let history = repo.load().await.unwrap();
    let filter = MarketFilter {
        category: Some("VGA".to_string()),
        ..Default::default()
    };
    let movers = price_movers(&history, &filter);
    assert_eq!(movers.gainers.len(), 1);
    assert_eq!(movers.gainers[0].model, "G1");
}
