// ==========================================
// 판매/재고 분석 대시보드 - 블롭 저장소 게이트웨이
// ==========================================
// 계약: 키 단위 전체 문서 읽기/덮어쓰기 (부분 갱신 없음)
// 동시성: 쓰기는 last-writer-wins. 업로드는 저빈도 단일 작성자
//         배치 작업이므로 충돌 감지는 하지 않는다.
// ==========================================

use crate::store::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

// ==========================================
// BlobStore Trait
// ==========================================
// 용도: 문서 저장 백엔드 추상화 (파일시스템 / 테스트용 메모리)
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 키의 전체 내용을 읽는다. 문서가 없으면 Ok(None).
    async fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// 키의 전체 내용을 덮어쓴다.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> StoreResult<()>;
}

// ==========================================
// FsBlobStore - 파일시스템 구현
// ==========================================
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// 기본 데이터 디렉터리 (플랫폼 데이터 폴더 하위)
    pub fn default_location() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sellout-dashboard");
        Self::new(root)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(key = %key, size = bytes.len(), "블롭 읽기 완료");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", self.root.display(), e)))?;
        let path = self.path_for(key);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        debug!(key = %key, size = bytes.len(), "블롭 쓰기 완료");
        Ok(())
    }
}

// ==========================================
// MemoryBlobStore - 인메모리 구현 (테스트용)
// ==========================================
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| StoreError::Backend(format!("락 획득 실패: {}", e)))?;
        Ok(blobs.get(key).cloned())
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> StoreResult<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| StoreError::Backend(format!("락 획득 실패: {}", e)))?;
        blobs.insert(key.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        assert!(store.read("k").await.unwrap().is_none());

        store.write("k", b"value".to_vec()).await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some(b"value".to_vec()));

        // 덮어쓰기 (last-writer-wins)
        store.write("k", b"v2".to_vec()).await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn test_fs_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.read("없는파일.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.write("doc.json", b"{}".to_vec()).await.unwrap();
        assert_eq!(store.read("doc.json").await.unwrap(), Some(b"{}".to_vec()));
    }
}
