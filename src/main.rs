// ==========================================
// 판매/재고 분석 대시보드 - CLI 엔트리포인트
// ==========================================
// 용도: 라이브러리를 감싸는 얇은 명령행 도구
// 명령: ingest / market / runrate / prices
// ==========================================

use sellout_dashboard::config::EngineConfig;
use sellout_dashboard::engine::{
    aggregate_by_model, analyze, latest_price_table, price_movers, MarketFilter, RecordFilter,
};
use sellout_dashboard::importer::IngestService;
use sellout_dashboard::store::{DashboardRepository, FsBlobStore, MarketRepository};
use sellout_dashboard::{logging, APP_NAME, VERSION};

const CONFIG_FILE: &str = "sellout-dashboard.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", APP_NAME);
    tracing::info!("버전: {}", VERSION);
    tracing::info!("==================================================");

    let config = EngineConfig::load_or_default(CONFIG_FILE)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.split_first() {
        Some((cmd, rest)) if cmd == "ingest" => ingest(&config, rest).await,
        Some((cmd, rest)) if cmd == "market" => market(&config, rest).await,
        Some((cmd, _)) if cmd == "runrate" => runrate(&config).await,
        Some((cmd, _)) if cmd == "prices" => prices(&config).await,
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("{} v{}", APP_NAME, VERSION);
    println!();
    println!("사용법:");
    println!("  sellout-dashboard ingest <파일...>   판매/재고 워크북 수집 및 저장");
    println!("  sellout-dashboard market <파일...>   시장 가격표 수집 및 저장");
    println!("  sellout-dashboard runrate            런레이트/재고 분석 출력");
    println!("  sellout-dashboard prices             가격 등락 TOP 10 출력");
}

fn dashboard_repo(config: &EngineConfig) -> DashboardRepository<FsBlobStore> {
    DashboardRepository::new(
        FsBlobStore::default_location(),
        config.data_file.clone(),
        config.cache_policy(),
    )
}

fn market_repo(config: &EngineConfig) -> MarketRepository<FsBlobStore> {
    MarketRepository::new(FsBlobStore::default_location(), config.market_file.clone())
}

/// 판매/재고 워크북 수집 → 병합 저장
async fn ingest(config: &EngineConfig, files: &[String]) -> anyhow::Result<()> {
    if files.is_empty() {
        anyhow::bail!("수집할 파일을 지정하세요");
    }

    let service = IngestService::new();
    let repo = dashboard_repo(config);

    for path in files {
        let bytes = std::fs::read(path)?;
        let parsed = service.ingest_workbook(&bytes, path)?;

        for warning in &parsed.warnings {
            println!("경고: {}", warning);
        }

        let reference_week = if parsed.reference_week == "Unknown" {
            None
        } else {
            Some(parsed.reference_week.clone())
        };
        let weekly_count = parsed.weekly.len();
        let snapshot_count = parsed.snapshot.len();
        let merged = repo
            .save(parsed.weekly, parsed.snapshot, Vec::new(), reference_week)
            .await?;

        println!(
            "{}: 주간 {}건 / 스냅샷 {}건 수집, 병합 후 총 {}건",
            path,
            weekly_count,
            snapshot_count,
            merged.len()
        );
    }
    Ok(())
}

/// 시장 가격표 수집 → 날짜별 저장
async fn market(config: &EngineConfig, files: &[String]) -> anyhow::Result<()> {
    if files.is_empty() {
        anyhow::bail!("수집할 파일을 지정하세요");
    }

    let mut buffers = Vec::new();
    for path in files {
        buffers.push((path.clone(), std::fs::read(path)?));
    }

    let service = IngestService::new();
    let today = chrono::Local::now().date_naive();
    let ingest = service.ingest_market_files(&buffers, None, today);

    for outcome in &ingest.results {
        println!("{}: {:?} - {}", outcome.name, outcome.status, outcome.msg);
    }

    let repo = market_repo(config);
    for (date, items) in ingest.batches {
        let saved = repo.save(items, &date).await?;
        println!("{}: {}건 저장", date, saved);
    }
    Ok(())
}

/// 런레이트/재고 충분성 분석 출력 (모델 단위 재집계)
async fn runrate(config: &EngineConfig) -> anyhow::Result<()> {
    let repo = dashboard_repo(config);
    let Some(doc) = repo.load(false).await? else {
        println!("저장된 데이터가 없습니다. 먼저 ingest를 실행하세요.");
        return Ok(());
    };

    let report = analyze(
        &doc.weekly_data,
        &doc.current_snapshot,
        config.run_rate_params(),
        &RecordFilter::default(),
    );

    println!(
        "기준: {} / 윈도: {} ({}주)",
        report.reference_week, report.window_label, config.window_weeks
    );
    println!(
        "{:<30} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "모델", "런레이트", "재고", "PO", "OTW", "WOS", "제안"
    );
    for row in aggregate_by_model(&report.rows, config.target_weeks) {
        println!(
            "{:<30} {:>10.1} {:>8.0} {:>8.0} {:>8.0} {:>8.1} {:>8}",
            row.model_name, row.run_rate, row.stock, row.po, row.otw, row.weeks_of_supply,
            row.suggested_order
        );
    }
    Ok(())
}

/// 가격 등락 TOP 10 출력
async fn prices(config: &EngineConfig) -> anyhow::Result<()> {
    let repo = market_repo(config);
    let history = repo.load().await?;
    if history.is_empty() {
        println!("저장된 가격 이력이 없습니다. 먼저 market을 실행하세요.");
        return Ok(());
    }

    let filter = MarketFilter::default();
    let movers = price_movers(&history, &filter);

    println!("상승 TOP {}:", movers.gainers.len());
    for mover in &movers.gainers {
        println!(
            "  {} {} {:.0} → {:.0} ({:+.1}%)",
            mover.brand, mover.model, mover.old_price, mover.new_price, mover.pct
        );
    }
    println!("하락 TOP {}:", movers.losers.len());
    for mover in &movers.losers {
        println!(
            "  {} {} {:.0} → {:.0} ({:+.1}%)",
            mover.brand, mover.model, mover.old_price, mover.new_price, mover.pct
        );
    }

    println!("최신가 {}건", latest_price_table(&history, &filter).len());
    Ok(())
}
