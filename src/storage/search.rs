//! Last movie search per chat, for follow-up detail requests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Duration;

use super::ttl::TtlMap;
use crate::catalog::MovieSummary;

/// Results of the latest search in a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub chat_id: i64,
    pub query: String,
    pub items: Vec<MovieSummary>,
    pub created_at: DateTime<Utc>,
}

/// Why a detail request cannot be served
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetailsError {
    #[error("no recent search in this chat")]
    NoSearch,

    #[error("result {index} is out of range 1..={len}")]
    OutOfRange { index: usize, len: usize },
}

impl SearchEntry {
    /// Picks the 1-indexed result `index`.
    pub fn select(&self, index: usize) -> Result<&MovieSummary, DetailsError> {
        if index == 0 {
            return Err(DetailsError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.get(index - 1).ok_or(DetailsError::OutOfRange {
            index,
            len: self.items.len(),
        })
    }
}

/// Resolves a detail request against the (possibly absent) stored search.
pub fn select_result(entry: Option<&SearchEntry>, index: usize) -> Result<&MovieSummary, DetailsError> {
    entry.ok_or(DetailsError::NoSearch)?.select(index)
}

/// chat id → latest search results, with a fixed time-to-live.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Stores the results, replacing any previous search for the chat.
    async fn put(&self, chat_id: i64, query: &str, items: Vec<MovieSummary>);

    /// Returns the live search for the chat; expired entries are removed.
    async fn get(&self, chat_id: i64) -> Option<SearchEntry>;

    /// Removes expired entries, returning how many were dropped.
    async fn sweep(&self) -> usize;
}

/// Process-local [`SearchStore`]
pub struct MemorySearchStore {
    entries: Mutex<TtlMap<i64, SearchEntry>>,
}

impl MemorySearchStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(TtlMap::new(ttl)),
        }
    }
}

#[async_trait]
impl SearchStore for MemorySearchStore {
    async fn put(&self, chat_id: i64, query: &str, items: Vec<MovieSummary>) {
        let entry = SearchEntry {
            chat_id,
            query: query.to_string(),
            items,
            created_at: Utc::now(),
        };
        self.entries.lock().await.insert(chat_id, entry);
    }

    async fn get(&self, chat_id: i64) -> Option<SearchEntry> {
        self.entries.lock().await.get(&chat_id)
    }

    async fn sweep(&self) -> usize {
        self.entries.lock().await.sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str) -> MovieSummary {
        MovieSummary {
            title: title.to_string(),
            year: "2000".into(),
            rating: "7.0".into(),
            overview: String::new(),
            poster_url: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_search_replaces_previous() {
        let store = MemorySearchStore::new(Duration::from_secs(600));
        store.put(1, "alien", vec![movie("Alien"), movie("Aliens")]).await;
        store.put(1, "heat", vec![movie("Heat")]).await;

        let entry = store.get(1).await.unwrap();
        assert_eq!(entry.query, "heat");
        assert_eq!(entry.items, vec![movie("Heat")]);
        assert!(store.get(2).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_expires() {
        let store = MemorySearchStore::new(Duration::from_secs(600));
        store.put(1, "alien", vec![movie("Alien")]).await;
        tokio::time::advance(Duration::from_secs(600)).await;
        assert!(store.get(1).await.is_none());
    }

    #[test]
    fn test_select_result_range() {
        let entry = SearchEntry {
            chat_id: 1,
            query: "alien".into(),
            items: vec![movie("Alien"), movie("Aliens"), movie("Alien 3")],
            created_at: Utc::now(),
        };

        assert_eq!(select_result(Some(&entry), 1).unwrap().title, "Alien");
        assert_eq!(select_result(Some(&entry), 3).unwrap().title, "Alien 3");
        assert_eq!(
            select_result(Some(&entry), 0),
            Err(DetailsError::OutOfRange { index: 0, len: 3 })
        );
        assert_eq!(
            select_result(Some(&entry), 4),
            Err(DetailsError::OutOfRange { index: 4, len: 3 })
        );
        assert_eq!(select_result(None, 1), Err(DetailsError::NoSearch));
    }
}
