// ==========================================
// 판매/재고 분석 대시보드 - 코어 라이브러리
// ==========================================
// 기술 스택: Rust + calamine + chrono + serde
// 시스템 정의: 스프레드시트 업로드를 정식 시계열 레코드로 변환하고,
//              기존 이력과 멱등 병합한 뒤 런레이트/재고 충분성/
//              가격 등락 분석을 제공하는 엔진
// ==========================================

// ==========================================
// 모듈 선언
// ==========================================

// 도메인 계층 - 엔티티와 타입
pub mod domain;

// 수집 계층 - 업로드 파싱
pub mod importer;

// 저장 계층 - 문서 블롭 리포지토리
pub mod store;

// 엔진 계층 - 순수 분석 계산
pub mod engine;

// 설정 계층
pub mod config;

// 로그 시스템
pub mod logging;

// ==========================================
// 핵심 타입 재수출
// ==========================================

// 도메인
pub use domain::{
    DashboardDocument, IsoWeek, MarketCategory, MarketHistory, MarketItem, RecordKind,
    SnapshotEntry, WeeklyRecord,
};

// 수집
pub use importer::{ImportError, ImportResult, IngestService, ParsedUpload, UploadOutcome};

// 저장
pub use store::{
    BlobStore, CachePolicy, DashboardRepository, FsBlobStore, MarketRepository, MemoryBlobStore,
    StoreError, StoreResult,
};

// 엔진
pub use engine::{
    aggregate_by_model, analyze, merge_weekly, price_movers, MarketFilter, RecordFilter,
    RunRateParams, RunRateReport,
};

// 설정
pub use config::EngineConfig;

// ==========================================
// 상수 정의
// ==========================================

// 시스템 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 시스템 이름
pub const APP_NAME: &str = "판매/재고 분석 대시보드";
