//! # Entity Cache
//!
//! A normalized in-memory cache of one entity table, keyed by record id and
//! patched incrementally from change-feed deltas.
//!
//! ## Why Normalized + Incremental?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cache Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: re-fetch the whole table on any change notification         │
//! │     (coarse, O(table) per event, floods the store)                      │
//! │                                                                         │
//! │  ✅ CORRECT: HashMap<id, record> patched per event                      │
//! │     insert/update with payload ──► upsert(record)                       │
//! │     delete                     ──► remove(id)                           │
//! │     payload-less insert/update ──► caller re-reads that one id          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The map is wrapped in `Arc<Mutex<…>>`: the feed listener task writes
//! while readers snapshot. Critical sections are short (single map ops or
//! one clone of the values).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use tracing::warn;

use gestio_core::EntityRecord;
use gestio_db::{ChangeAction, ChangeEvent};

/// Normalized cache of one entity table.
#[derive(Debug)]
pub struct EntityCache<T> {
    inner: Arc<Mutex<HashMap<String, T>>>,
}

impl<T> Clone for EntityCache<T> {
    fn clone(&self) -> Self {
        EntityCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> EntityCache<T>
where
    T: EntityRecord + Clone + DeserializeOwned,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        EntityCache {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replaces the whole cache content (startup warm or lag re-sync).
    pub fn replace_all(&self, records: Vec<T>) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.clear();
        for record in records {
            map.insert(record.record_id().to_string(), record);
        }
    }

    /// Inserts or replaces one record.
    pub fn upsert(&self, record: T) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(record.record_id().to_string(), record);
    }

    /// Removes a record by id.
    pub fn remove(&self, id: &str) -> Option<T> {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.remove(id)
    }

    /// Returns a clone of the record with the given id.
    pub fn get(&self, id: &str) -> Option<T> {
        let map = self.inner.lock().expect("cache mutex poisoned");
        map.get(id).cloned()
    }

    /// Returns a snapshot of all cached records (unordered).
    pub fn all(&self) -> Vec<T> {
        let map = self.inner.lock().expect("cache mutex poisoned");
        map.values().cloned().collect()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        let map = self.inner.lock().expect("cache mutex poisoned");
        map.len()
    }

    /// Checks if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies one change-feed event.
    ///
    /// Inserts/updates without a payload are skipped here; the restore path
    /// re-reads the record through its typed repository instead.
    pub fn apply(&self, event: &ChangeEvent) {
        match event.action {
            ChangeAction::Insert | ChangeAction::Update => {
                let Some(payload) = &event.payload else {
                    return;
                };

                match serde_json::from_value::<T>(payload.clone()) {
                    Ok(record) => self.upsert(record),
                    Err(e) => {
                        warn!(entity = ?event.entity, id = %event.id, error = %e,
                              "Failed to decode change payload; cache entry skipped");
                    }
                }
            }
            ChangeAction::Delete => {
                self.remove(&event.id);
            }
        }
    }
}

impl<T> Default for EntityCache<T>
where
    T: EntityRecord + Clone + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gestio_core::{Category, EntityKind, EntityStatus};

    fn category(id: &str, name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            status: EntityStatus::Active,
            product_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_upsert_get_remove() {
        let cache: EntityCache<Category> = EntityCache::new();

        cache.upsert(category("c1", "Bebidas"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("c1").unwrap().name, "Bebidas");

        cache.upsert(category("c1", "Limpeza"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("c1").unwrap().name, "Limpeza");

        cache.remove("c1");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_apply_insert_and_delete_events() {
        let cache: EntityCache<Category> = EntityCache::new();
        let record = category("c1", "Bebidas");

        cache.apply(&ChangeEvent::with_record(
            EntityKind::Categories,
            ChangeAction::Insert,
            "c1",
            &record,
        ));
        assert_eq!(cache.get("c1").unwrap().name, "Bebidas");

        cache.apply(&ChangeEvent::bare(
            EntityKind::Categories,
            ChangeAction::Delete,
            "c1",
        ));
        assert!(cache.get("c1").is_none());
    }

    #[test]
    fn test_apply_payload_less_update_is_skipped() {
        let cache: EntityCache<Category> = EntityCache::new();
        cache.upsert(category("c1", "Bebidas"));

        cache.apply(&ChangeEvent::bare(
            EntityKind::Categories,
            ChangeAction::Update,
            "c1",
        ));

        // Unchanged, not dropped
        assert_eq!(cache.get("c1").unwrap().name, "Bebidas");
    }

    #[test]
    fn test_replace_all() {
        let cache: EntityCache<Category> = EntityCache::new();
        cache.upsert(category("old", "Velha"));

        cache.replace_all(vec![category("c1", "Bebidas"), category("c2", "Limpeza")]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("old").is_none());
    }
}
