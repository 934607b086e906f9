//! # Inventory Snapshots
//!
//! Whole-inventory save and load. The tag list and the tier state are kept
//! as two JSON blobs under fixed keys and always written together.
//!
//! ```text
//! ┌──────────────────────┐   save(&Inventory)   ┌──────────────────────────┐
//! │  TagStore writer task│ ───────────────────► │  dyn SnapshotStore       │
//! │  (tagwriter-session) │ ◄─────────────────── │  ├── SqliteSnapshotStore │
//! └──────────────────────┘   load() / load_tier │  └── MemorySnapshotStore │
//!                                               └──────────────────────────┘
//! ```
//!
//! ## Missing Keys
//! - no `saved_nfc_tags` → empty list
//! - no `tier_state` → free tier, counter set to the number of loaded tags
//!
//! A blob that fails to decode is logged and handled as if it were missing.
//! Only the unreadable key is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use tagwriter_core::{Inventory, TagRecord, TierState};

use crate::error::{DbError, DbResult};
use crate::repository::storage::StorageRepository;

pub const TAGS_KEY: &str = "saved_nfc_tags";
pub const TIER_KEY: &str = "tier_state";

/// Persistence seam for the tag store.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replaces the stored snapshot with `inventory`.
    async fn save(&self, inventory: &Inventory) -> DbResult<()>;

    /// Reads the stored snapshot, or an empty free-tier inventory.
    async fn load(&self) -> DbResult<Inventory>;

    /// Reads only the tier blob. `None` when nothing was ever saved.
    async fn load_tier(&self) -> DbResult<Option<TierState>>;
}

// =============================================================================
// Encoding
// =============================================================================

fn encode(inventory: &Inventory) -> DbResult<[(&'static str, String); 2]> {
    let tags = serde_json::to_string(inventory.records())
        .map_err(|e| DbError::serialization(TAGS_KEY, e))?;
    let tier = serde_json::to_string(inventory.tier())
        .map_err(|e| DbError::serialization(TIER_KEY, e))?;
    Ok([(TAGS_KEY, tags), (TIER_KEY, tier)])
}

/// Decodes one blob. A value that no longer parses is logged and treated
/// as missing, so the other blob still loads.
fn decode_key<T: serde::de::DeserializeOwned>(key: &'static str, raw: Option<&str>) -> Option<T> {
    let json = raw?;
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            let e = DbError::serialization(key, e);
            error!(error = %e, bytes = json.len(), "Discarding unreadable snapshot blob");
            None
        }
    }
}

fn decode_tier(raw: Option<&str>) -> Option<TierState> {
    decode_key(TIER_KEY, raw)
}

fn decode(tags: Option<&str>, tier: Option<&str>) -> Inventory {
    let records: Vec<TagRecord> = decode_key(TAGS_KEY, tags).unwrap_or_default();

    let tier = decode_tier(tier).unwrap_or_else(|| {
        let tag_count = u32::try_from(records.len()).unwrap_or(u32::MAX);
        TierState {
            tag_count,
            ..TierState::default()
        }
    });

    debug!(
        tags = records.len(),
        premium = tier.is_premium,
        "Decoded inventory snapshot"
    );

    Inventory::from_parts(records, tier)
}

// =============================================================================
// SQLite
// =============================================================================

/// Snapshot store over the `app_storage` table.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    storage: StorageRepository,
}

impl SqliteSnapshotStore {
    pub fn new(storage: StorageRepository) -> Self {
        SqliteSnapshotStore { storage }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn save(&self, inventory: &Inventory) -> DbResult<()> {
        let entries = encode(inventory)?;
        self.storage.put_many(&entries).await
    }

    async fn load(&self) -> DbResult<Inventory> {
        let tags = self.storage.get(TAGS_KEY).await?;
        let tier = self.storage.get(TIER_KEY).await?;
        Ok(decode(tags.as_deref(), tier.as_deref()))
    }

    async fn load_tier(&self) -> DbResult<Option<TierState>> {
        let tier = self.storage.get(TIER_KEY).await?;
        Ok(decode_tier(tier.as_deref()))
    }
}

// =============================================================================
// In-Memory
// =============================================================================

/// Snapshot store that keeps the encoded blobs in a map.
///
/// Counts saves and can be told to fail, so callers can check what reached
/// storage and what did not.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `inventory`, as if saved by an earlier run.
    pub fn with_inventory(inventory: &Inventory) -> DbResult<Self> {
        let entries = encode(inventory)?
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Ok(MemorySnapshotStore {
            entries: Mutex::new(entries),
            ..Default::default()
        })
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes every following save return an error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The stored blob under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Overwrites a blob directly, bypassing encoding.
    pub async fn put_raw(&self, key: &str, value: impl Into<String>) {
        self.entries.lock().await.insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, inventory: &Inventory) -> DbResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            warn!("Memory snapshot store rejecting save");
            return Err(DbError::Internal("snapshot store unavailable".to_string()));
        }

        let encoded = encode(inventory)?;
        let mut entries = self.entries.lock().await;
        for (key, value) in encoded {
            entries.insert(key.to_string(), value);
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> DbResult<Inventory> {
        let entries = self.entries.lock().await;
        Ok(decode(
            entries.get(TAGS_KEY).map(String::as_str),
            entries.get(TIER_KEY).map(String::as_str),
        ))
    }

    async fn load_tier(&self) -> DbResult<Option<TierState>> {
        let entries = self.entries.lock().await;
        Ok(decode_tier(entries.get(TIER_KEY).map(String::as_str)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use tagwriter_core::{NewTag, TagType};

    fn sample() -> Inventory {
        let mut inventory = Inventory::new(TierState::free(10));
        for (i, name) in ["Menu", "Wifi", "Reviews"].iter().enumerate() {
            inventory
                .add(
                    NewTag::new(*name, format!("https://cafe.example/{i}"), TagType::Ntag215),
                    format!("tag-{i}"),
                    Utc::now(),
                )
                .unwrap();
        }
        inventory.record_access("tag-1", Utc::now());
        inventory
    }

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = db.snapshots();
        let inventory = sample();

        store.save(&inventory).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, inventory);
        assert_eq!(store.load_tier().await.unwrap(), Some(inventory.tier().clone()));
    }

    #[tokio::test]
    async fn test_empty_database_loads_default() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = db.snapshots();

        let loaded = store.load().await.unwrap();
        assert!(loaded.records().is_empty());
        assert_eq!(loaded.tier(), &TierState::default());
        assert_eq!(store.load_tier().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_tier_counts_loaded_tags() {
        let store = MemorySnapshotStore::with_inventory(&sample()).unwrap();
        store.entries.lock().await.remove(TIER_KEY);

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.tier().tag_count, 3);
        assert!(!loaded.tier().is_premium);
    }

    #[tokio::test]
    async fn test_corrupt_tags_keep_tier() {
        let mut inventory = sample();
        inventory.activate_premium();
        let store = MemorySnapshotStore::with_inventory(&inventory).unwrap();
        store.put_raw(TAGS_KEY, "[{\"id\": \"tag-0\", \"na").await;

        let loaded = store.load().await.unwrap();
        assert!(loaded.records().is_empty());
        assert!(loaded.tier().is_premium);
        assert_eq!(loaded.tier().tag_count, 3);
    }

    #[tokio::test]
    async fn test_corrupt_tier_keeps_tags() {
        let store = MemorySnapshotStore::with_inventory(&sample()).unwrap();
        store.put_raw(TIER_KEY, "{not json").await;

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.total_count(), 3);
        assert_eq!(loaded.tier().tag_count, 3);
        assert!(!loaded.tier().is_premium);
        assert_eq!(store.load_tier().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failing_store_keeps_previous_blob() {
        let inventory = sample();
        let store = MemorySnapshotStore::with_inventory(&inventory).unwrap();
        let before = store.raw(TAGS_KEY).await;

        store.set_failing(true);
        assert!(store.save(&Inventory::default()).await.is_err());
        assert_eq!(store.raw(TAGS_KEY).await, before);
        assert_eq!(store.save_count(), 0);
    }
}
