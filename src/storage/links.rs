//! Short tokens standing in for long URLs in callback payloads
//!
//! Telegram limits callback data to 64 bytes, so quality buttons carry
//! `dl:<quality>:<token>` and the token is resolved back to the URL here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::Duration;

use super::ttl::TtlMap;

/// Length of the random part of a token
const TOKEN_SUFFIX_LEN: usize = 6;

/// A stored link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub token: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

/// Token → URL store with a fixed time-to-live.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Stores the URL and returns a freshly generated token.
    async fn put(&self, url: &str) -> String;

    /// Resolves a token. Expired entries are removed and reported as absent.
    async fn get(&self, token: &str) -> Option<String>;

    /// Removes expired entries, returning how many were dropped.
    async fn sweep(&self) -> usize;
}

/// Process-local [`LinkStore`]
pub struct MemoryLinkStore {
    entries: Mutex<TtlMap<String, LinkEntry>>,
}

impl MemoryLinkStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(TtlMap::new(ttl)),
        }
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn put(&self, url: &str) -> String {
        let token = generate_token();
        let entry = LinkEntry {
            token: token.clone(),
            original_url: url.to_string(),
            created_at: Utc::now(),
        };
        self.entries.lock().await.insert(token.clone(), entry);
        log::debug!("Stored link token {} for {}", token, url);
        token
    }

    async fn get(&self, token: &str) -> Option<String> {
        self.entries
            .lock()
            .await
            .get(&token.to_string())
            .map(|entry| entry.original_url)
    }

    async fn sweep(&self) -> usize {
        self.entries.lock().await.sweep()
    }
}

/// Generates a token: base36 millisecond timestamp followed by a random alphanumeric suffix.
///
/// Collisions are not detected; two links stored in the same millisecond would
/// also need to draw the same 6-character suffix.
pub fn generate_token() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}{}", to_base36(millis), suffix)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}
