//! In-memory subscription cache backed by a `SubscriptionStore`
//!
//! Entries are keyed by (type, genre). Each key maps to an immutable list
//! that is swapped whole on every change, so readers always see either the
//! old list or the new one.
//!
//! Writers to the same key are serialized from the store write until the
//! entry swap, so the store and the cache apply updates in the same order.
//! Writers to different keys do not wait on each other.

use super::catalog::Genre;
use super::error::Result;
use super::reader::SubscriptionStore;
use super::types::{Subscription, SubscriptionType};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type Key = (SubscriptionType, Genre);

pub struct SubscriptionCache {
    store: Arc<dyn SubscriptionStore>,
    entries: RwLock<HashMap<Key, Arc<Vec<Subscription>>>>,
    writers: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}

impl SubscriptionCache {
    /// Empty cache; call `load` to fill it from the store
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
            writers: Mutex::new(HashMap::new()),
        }
    }

    async fn writer(&self, key: Key) -> Arc<Mutex<()>> {
        self.writers.lock().await.entry(key).or_default().clone()
    }

    /// Replace the whole cache with the store's rows
    pub async fn load(&self) -> Result<usize> {
        let rows = self.store.list_subscriptions().await?;
        let count = rows.len();

        let mut grouped: HashMap<Key, Vec<Subscription>> = HashMap::new();
        for row in rows {
            let key = (row.subscription_type, row.genre);
            let list = grouped.entry(key).or_default();
            list.retain(|s| s.guild_id != row.guild_id);
            list.push(row);
        }

        let mut entries = self.entries.write().await;
        *entries = grouped.into_iter().map(|(k, v)| (k, Arc::new(v))).collect();

        log::info!("📋 Loaded {} subscriptions into {} keys", count, entries.len());
        Ok(count)
    }

    /// Persist, then replace the guild's entry under the key
    pub async fn subscribe(&self, subscription: Subscription) -> Result<()> {
        let key = (subscription.subscription_type, subscription.genre);
        let writer = self.writer(key).await;
        let _guard = writer.lock().await;

        self.store.upsert_subscription(&subscription).await?;

        let mut entries = self.entries.write().await;
        let mut list: Vec<Subscription> = entries
            .get(&key)
            .map(|l| l.iter().filter(|s| s.guild_id != subscription.guild_id).cloned().collect())
            .unwrap_or_default();

        log::info!(
            "➕ {} subscribed channel {} to {} {}",
            subscription.guild_id,
            subscription.channel_id,
            key.0,
            key.1
        );
        list.push(subscription);
        entries.insert(key, Arc::new(list));
        Ok(())
    }

    /// Delete from the store, then drop the guild's entry under the key
    pub async fn unsubscribe(
        &self,
        guild_id: &str,
        subscription_type: SubscriptionType,
        genre: Genre,
    ) -> Result<()> {
        let key = (subscription_type, genre);
        let writer = self.writer(key).await;
        let _guard = writer.lock().await;

        self.store
            .delete_subscription(guild_id, subscription_type, genre)
            .await?;

        let mut entries = self.entries.write().await;
        if let Some(current) = entries.get(&key) {
            let list: Vec<Subscription> = current
                .iter()
                .filter(|s| s.guild_id != guild_id)
                .cloned()
                .collect();
            if list.is_empty() {
                entries.remove(&key);
            } else {
                entries.insert(key, Arc::new(list));
            }
        }

        log::info!("➖ {} unsubscribed from {} {}", guild_id, subscription_type, genre);
        Ok(())
    }

    /// Snapshot of the subscriptions for a key
    pub async fn subscribers(&self, subscription_type: SubscriptionType, genre: Genre) -> Arc<Vec<Subscription>> {
        self.entries
            .read()
            .await
            .get(&(subscription_type, genre))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn channels_for(&self, subscription_type: SubscriptionType, genre: Genre) -> Vec<String> {
        self.subscribers(subscription_type, genre)
            .await
            .iter()
            .map(|s| s.channel_id.clone())
            .collect()
    }
}
