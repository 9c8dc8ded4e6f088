// ==========================================
// 판매/재고 분석 대시보드 - 시장 가격 이력 리포지토리
// ==========================================
// 책임: MarketHistory[] 문서의 로드 / 날짜 단위 교체 저장
// 규칙: 같은 날짜 재업로드는 그 날짜 엔트리만 통째로 교체하고
//       나머지 날짜는 건드리지 않는다. 저장 후 날짜 오름차순 정렬.
// ==========================================

use crate::domain::record::{MarketHistory, MarketItem};
use crate::store::blob_store::BlobStore;
use crate::store::error::StoreResult;
use tracing::{debug, info};

pub struct MarketRepository<S: BlobStore> {
    store: S,
    key: String,
}

impl<S: BlobStore> MarketRepository<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// 전체 이력 로드. 문서가 없으면 빈 목록 (에러 아님).
    /// 읽은 뒤 날짜 오름차순 정렬을 보장한다.
    pub async fn load(&self) -> StoreResult<Vec<MarketHistory>> {
        let Some(bytes) = self.store.read(&self.key).await? else {
            debug!(key = %self.key, "시장 가격 이력 없음");
            return Ok(Vec::new());
        };
        let mut history: Vec<MarketHistory> = serde_json::from_slice(&bytes)?;
        history.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(history)
    }

    /// 한 날짜의 항목들을 저장한다.
    ///
    /// 항목은 정규화(브랜드/모델 공백 정리) 후 해당 날짜의 기존
    /// 엔트리를 교체하며, 전체 이력을 날짜 오름차순으로 재정렬해
    /// 통째로 덮어쓴다. 반환값은 저장된 항목 수.
    pub async fn save(&self, items: Vec<MarketItem>, date: &str) -> StoreResult<usize> {
        let mut history = self.load().await?;

        let clean_items: Vec<MarketItem> = items
            .into_iter()
            .map(|mut item| {
                item.brand = item.brand.trim().to_string();
                item.model = item.model.trim().to_string();
                item
            })
            .collect();
        let saved = clean_items.len();

        // 해당 날짜 엔트리만 제거 후 새 엔트리 삽입
        history.retain(|h| h.date != date);
        history.push(MarketHistory {
            date: date.to_string(),
            items: clean_items,
        });
        history.sort_by(|a, b| a.date.cmp(&b.date));

        let bytes = serde_json::to_vec(&history)?;
        self.store.write(&self.key, bytes).await?;

        info!(key = %self.key, date = %date, items = saved, dates = history.len(), "시장 가격 저장 완료");
        Ok(saved)
    }
}
