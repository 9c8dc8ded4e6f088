// ==========================================
// 판매/재고 분석 대시보드 - 설정 계층
// ==========================================
// 책임: 분석 파라미터와 저장 키의 기본값 + 파일 오버라이드
// 저장: JSON 파일 (없으면 기본값, 파싱 실패는 에러)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 엔진 설정. 모든 필드에 기본값이 있어 부분 오버라이드가 가능하다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 런레이트 추적 윈도 주수 (W)
    pub window_weeks: u32,
    /// 목표 커버리지 주수 (T)
    pub target_weeks: u32,
    /// 판매/재고 문서 저장 키
    pub data_file: String,
    /// 시장 가격 이력 저장 키
    pub market_file: String,
    /// 문서 캐시 TTL(초). None이면 프로세스 수명 동안 유지.
    pub cache_ttl_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_weeks: 4,
            target_weeks: 8,
            data_file: "dashboard_data.json".to_string(),
            market_file: "market_price_history.json".to_string(),
            cache_ttl_secs: None,
        }
    }
}

impl EngineConfig {
    /// 설정 파일 로드. 파일이 없으면 기본값 (에러 아님),
    /// 파일이 있는데 깨져 있으면 에러 (조용히 기본값으로 덮지 않음).
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 런레이트 엔진 파라미터로 변환
    pub fn run_rate_params(&self) -> crate::engine::run_rate::RunRateParams {
        crate::engine::run_rate::RunRateParams {
            window_weeks: self.window_weeks,
            target_weeks: self.target_weeks,
        }
    }

    /// 캐시 정책으로 변환
    pub fn cache_policy(&self) -> crate::store::dashboard_repo::CachePolicy {
        match self.cache_ttl_secs {
            Some(secs) => crate::store::dashboard_repo::CachePolicy::with_ttl(
                std::time::Duration::from_secs(secs),
            ),
            None => crate::store::dashboard_repo::CachePolicy::forever(),
        }
    }
}
