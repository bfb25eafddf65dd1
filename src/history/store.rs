//! History persistence
//!
//! The file store keeps the list as a JSON array of strings. Anything that
//! cannot be read back as such is treated as an empty history.

use super::SearchHistory;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;
use tracing::{info, warn};

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn load(&self) -> AppResult<SearchHistory>;
    async fn save(&self, history: &SearchHistory) -> AppResult<()>;
}

/// JSON file on local disk
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> AppResult<SearchHistory> {
        if !self.path.exists() {
            info!("No history file found, starting empty");
            return Ok(SearchHistory::new());
        }

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read history, starting empty");
                return Ok(SearchHistory::new());
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(entries) => Ok(SearchHistory::from_entries(entries)),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "History file is corrupt, starting empty");
                Ok(SearchHistory::new())
            }
        }
    }

    async fn save(&self, history: &SearchHistory) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::History(format!("{:?}: {}", parent, e)))?;
        }

        let content = serde_json::to_string(history).map_err(|e| AppError::History(e.to_string()))?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::History(format!("{:?}: {}", self.path, e)))?;

        info!(entries = history.len(), "Saved search history");
        Ok(())
    }
}

/// In-process store, for tests and for running without persistence
#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn stored(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> AppResult<SearchHistory> {
        Ok(SearchHistory::from_entries(self.stored()))
    }

    async fn save(&self, history: &SearchHistory) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::History("history lock poisoned".to_string()))?;
        *entries = history.entries().to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHistoryStore::new(temp_dir.path().join("nested").join("history.json"));

        let mut history = SearchHistory::new();
        history.record("Stripe");
        history.record("Figma");
        store.save(&history).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"["Figma","Stripe"]"#);

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHistoryStore::new(temp_dir.path().join("history.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");

        for garbage in ["not json", r#"{"a": 1}"#, "[1, 2, 3]"] {
            std::fs::write(&path, garbage).unwrap();
            let store = FileHistoryStore::new(&path);
            assert!(store.load().await.unwrap().is_empty(), "{} should load empty", garbage);
        }
    }

    #[tokio::test]
    async fn test_oversized_file_is_truncated_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, r#"["a","b","B","c","d","e","f"]"#).unwrap();

        let loaded = FileHistoryStore::new(&path).load().await.unwrap();
        assert_eq!(loaded.entries(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryHistoryStore::with_entries(vec!["Acme".to_string()]);
        let loaded = tokio_test::block_on(store.load()).unwrap();
        assert_eq!(loaded.entries(), ["Acme"]);

        let mut history = loaded;
        history.record("Globex");
        tokio_test::block_on(store.save(&history)).unwrap();
        assert_eq!(store.stored(), vec!["Globex".to_string(), "Acme".to_string()]);
    }
}
