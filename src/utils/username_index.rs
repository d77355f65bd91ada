use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use super::username_cache::UsernameCache;
use super::username_filter::UsernameFilter;
use crate::store::{Store, StoreResult, UserStore};

/// Username availability pre-check.
///
/// The cuckoo filter answers "definitely free", the cache answers "definitely
/// taken", and the store settles everything in between. The store's unique
/// constraint stays the final word at insert time.
#[derive(Clone, Default)]
pub struct UsernameIndex {
    filter: Arc<UsernameFilter>,
    cache: UsernameCache,
}

impl UsernameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// true  => username AVAILABLE
    /// false => username TAKEN
    pub async fn is_available(&self, store: &dyn Store, username: &str) -> StoreResult<bool> {
        // 1️⃣ Cuckoo filter: fast negative
        if !self.filter.might_exist(username) {
            return Ok(true);
        }

        // 2️⃣ Moka cache: fast positive
        if self.cache.is_taken(username).await {
            return Ok(false);
        }

        // 3️⃣ Store fallback
        let taken = store.find_user_by_username(username).await?.is_some();
        if taken {
            self.cache.mark_taken(username).await;
        }
        Ok(!taken)
    }

    pub async fn record(&self, username: &str) {
        self.filter.insert(username);
        self.cache.mark_taken(username).await;
    }

    pub async fn forget(&self, username: &str) {
        self.filter.remove(username);
        self.cache.forget(username).await;
    }

    /// Every stored username goes into the filter.
    pub async fn warmup_filter(&self, store: &dyn Store, batch_size: usize) -> Result<usize> {
        let usernames = store
            .usernames(None)
            .await
            .context("loading usernames for the filter")?;

        for batch in usernames.chunks(batch_size.max(1)) {
            self.filter.insert_batch(batch);
        }

        log::info!("Username filter warmup complete: {} users", usernames.len());
        Ok(usernames.len())
    }

    /// Usernames that logged in during the last `days` go into the cache.
    pub async fn warmup_cache(
        &self,
        store: &dyn Store,
        days: u32,
        batch_size: usize,
    ) -> Result<usize> {
        let since = Utc::now() - Duration::days(i64::from(days));
        let usernames = store
            .usernames(Some(since))
            .await
            .context("loading recent usernames for the cache")?;

        for batch in usernames.chunks(batch_size.max(1)) {
            self.cache.mark_batch(batch).await;
        }

        log::info!(
            "Username cache warmup complete: {} recent users (last {} days)",
            usernames.len(),
            days
        );
        Ok(usernames.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{role::Role, user::NewUser};
    use crate::store::MemoryStore;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "x".into(),
            role: Role::Customer,
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn availability_follows_the_store() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();

        assert!(index.is_available(&store, "ada").await.unwrap());

        store.create_user(new_user("ada")).await.unwrap();
        // Not recorded yet: the filter still says free.
        assert!(index.is_available(&store, "ada").await.unwrap());

        assert_eq!(index.warmup_filter(&store, 10).await.unwrap(), 1);
        assert!(!index.is_available(&store, "ADA").await.unwrap());

        index.forget("ada").await;
        assert!(index.is_available(&store, "ada").await.unwrap());
    }

    #[tokio::test]
    async fn recorded_names_are_taken() {
        let store = MemoryStore::new();
        let index = UsernameIndex::new();
        store.create_user(new_user("grace")).await.unwrap();
        index.record("grace").await;
        assert!(!index.is_available(&store, "grace").await.unwrap());
    }
}
