use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::analysis_record::AnalysisRecord;

/// In-memory store for completed analyses, keyed by record id. No eviction
/// and no durability: a restart clears it.
#[derive(Default)]
pub struct ResultStore {
    records: RwLock<HashMap<String, AnalysisRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: AnalysisRecord) -> String {
        let id = record.id.clone();
        self.records.write().await.insert(id.clone(), record);
        id
    }

    pub async fn get(&self, id: &str) -> Option<AnalysisRecord> {
        self.records.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.records.write().await.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::ResultStore;
    use crate::domain::analysis_record::AnalysisRecord;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = ResultStore::new();
        let record = AnalysisRecord::failure("https://example.com/", "x".to_string());
        let id = store.insert(record).await;

        let fetched = store.get(&id).await.unwrap();
        assert_eq!(fetched.id, id);
    }

    #[tokio::test]
    async fn delete_then_get_misses() {
        let store = ResultStore::new();
        let record = AnalysisRecord::failure("https://example.com/", "x".to_string());
        let id = store.insert(record).await;

        assert!(store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(!store.remove(&id).await);
    }

    #[tokio::test]
    async fn unknown_id_misses() {
        let store = ResultStore::new();
        assert!(store.get("nope").await.is_none());
    }
}
