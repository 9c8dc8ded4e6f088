// ==========================================
// 판매/재고 분석 대시보드 - 저장 계층 에러 타입
// ==========================================
// 주의: "문서 없음"은 에러가 아니다 (최초 사용 시 이전 데이터가
// 없는 것이 정상). 읽기는 Option으로 부재를 표현한다.
// ==========================================

use thiserror::Error;

/// 저장 계층 에러 타입
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("저장소 입출력 실패: {0}")]
    Io(String),

    #[error("문서 직렬화 실패: {0}")]
    Serialization(String),

    #[error("저장소 백엔드 에러: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result 타입 별칭
pub type StoreResult<T> = Result<T, StoreError>;
