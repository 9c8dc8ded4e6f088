// ==========================================
// 판매/재고 분석 대시보드 - 대시보드 문서 리포지토리
// ==========================================
// 책임: 판매/재고 문서의 로드(캐시) / 병합 저장
// 재설계: 모듈 전역 캐시 대신 주입 가능한 캐시 정책을 가진
//         명시적 리포지토리 객체로 구성 (테스트 격리 가능)
// ==========================================

use crate::domain::record::{DashboardDocument, SnapshotEntry, WeeklyRecord};
use crate::engine::merge::merge_weekly;
use crate::store::blob_store::BlobStore;
use crate::store::error::StoreResult;
use chrono::Utc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ==========================================
// CachePolicy - 캐시 수명 정책
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CachePolicy {
    /// None이면 프로세스 수명 동안 유지, Some(ttl)이면 ttl 경과 후 재로드
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    pub fn forever() -> Self {
        Self { ttl: None }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }

    fn is_fresh(&self, loaded_at: Instant) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => loaded_at.elapsed() < ttl,
        }
    }
}

// ==========================================
// DashboardRepository - 문서 리포지토리
// ==========================================
pub struct DashboardRepository<S: BlobStore> {
    store: S,
    key: String,
    policy: CachePolicy,
    cache: Mutex<Option<(DashboardDocument, Instant)>>,
}

impl<S: BlobStore> DashboardRepository<S> {
    pub fn new(store: S, key: impl Into<String>, policy: CachePolicy) -> Self {
        Self {
            store,
            key: key.into(),
            policy,
            cache: Mutex::new(None),
        }
    }

    /// 문서 로드. 캐시가 신선하면 저장소에 가지 않는다.
    ///
    /// 문서가 아직 없으면(최초 사용) Ok(None) - 에러가 아니다.
    pub async fn load(&self, force_refresh: bool) -> StoreResult<Option<DashboardDocument>> {
        if !force_refresh {
            if let Ok(cache) = self.cache.lock() {
                if let Some((doc, loaded_at)) = cache.as_ref() {
                    if self.policy.is_fresh(*loaded_at) {
                        debug!(key = %self.key, "캐시에서 문서 반환");
                        return Ok(Some(doc.clone()));
                    }
                }
            }
        }

        let Some(bytes) = self.store.read(&self.key).await? else {
            debug!(key = %self.key, "저장된 문서 없음 (최초 사용)");
            if let Ok(mut cache) = self.cache.lock() {
                *cache = None;
            }
            return Ok(None);
        };

        let doc: DashboardDocument = serde_json::from_slice(&bytes)?;
        debug!(
            key = %self.key,
            weekly = doc.weekly_data.len(),
            snapshot = doc.current_snapshot.len(),
            "문서 로드 및 캐시 갱신"
        );

        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some((doc.clone(), Instant::now()));
        }
        Ok(Some(doc))
    }

    /// 병합 저장: 기존 주간 데이터에 새 데이터를 upsert하고,
    /// 스냅샷은 통째로 교체한 뒤 문서 전체를 덮어쓴다.
    ///
    /// 반환값은 병합 후의 주간 데이터 전체.
    pub async fn save(
        &self,
        new_weekly: Vec<WeeklyRecord>,
        new_snapshot: Vec<SnapshotEntry>,
        analysis_result: Vec<serde_json::Value>,
        reference_week: Option<String>,
    ) -> StoreResult<Vec<WeeklyRecord>> {
        // 저장 중의 로드 실패는 빈 기존 데이터로 간주하고 진행
        // (최초 저장을 막지 않기 위함)
        let existing = match self.load(false).await {
            Ok(Some(doc)) => doc.weekly_data,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "저장 전 로드 실패, 빈 데이터로 진행");
                Vec::new()
            }
        };

        let existing_len = existing.len();
        let incoming_len = new_weekly.len();
        let merged = merge_weekly(existing, new_weekly);

        let doc = DashboardDocument {
            weekly_data: merged.clone(),
            current_snapshot: new_snapshot, // 스냅샷은 항상 최신으로 교체
            analysis_result,
            reference_week: reference_week.unwrap_or_else(|| "N/A".to_string()),
            updated_at: Utc::now().to_rfc3339(),
        };

        let bytes = serde_json::to_vec(&doc)?;
        self.store.write(&self.key, bytes).await?;

        if let Ok(mut cache) = self.cache.lock() {
            *cache = Some((doc, Instant::now()));
        }

        info!(
            key = %self.key,
            existing = existing_len,
            incoming = incoming_len,
            merged = merged.len(),
            "문서 병합 저장 완료"
        );
        Ok(merged)
    }

    /// 캐시 수동 무효화
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
        debug!(key = %self.key, "캐시 초기화");
    }
}
