use std::time::Duration;

use moka::future::Cache;

use super::username_filter::normalize;

const CACHE_CAPACITY: u64 = 500_000;
const CACHE_TTL: Duration = Duration::from_secs(86400);

/// Recently seen taken usernames.
///
/// Only taken names are stored; absence means "ask someone else".
#[derive(Clone)]
pub struct UsernameCache {
    inner: Cache<String, ()>,
}

impl Default for UsernameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl UsernameCache {
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    pub async fn mark_taken(&self, username: &str) {
        self.inner.insert(normalize(username), ()).await;
    }

    pub async fn is_taken(&self, username: &str) -> bool {
        self.inner.contains_key(&normalize(username))
    }

    pub async fn forget(&self, username: &str) {
        self.inner.invalidate(&normalize(username)).await;
    }

    /// Mark a batch concurrently.
    pub async fn mark_batch(&self, usernames: &[String]) {
        let inserts: Vec<_> = usernames
            .iter()
            .map(|u| self.inner.insert(normalize(u), ()))
            .collect();

        futures::future::join_all(inserts).await;
    }
}
