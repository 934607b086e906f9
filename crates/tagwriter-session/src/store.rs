//! # Tag Store
//!
//! The live inventory: applies mutations in memory, publishes the result,
//! and hands a snapshot to a background writer for persistence.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_tag / update_tag / delete_tag / record_access / tier changes       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock inventory ──► Inventory rule check ──► Err: nothing changes       │
//! │       │                                                                 │
//! │       ▼ Ok                                                              │
//! │  queue SaveJob::Save(clone) ──► publish on watch ──► return to caller   │
//! │       │                                                                 │
//! │       ▼ (writer task, in queue order)                                   │
//! │  SnapshotStore::save ──► Err: tracing::error!, not returned             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Saves are queued while the inventory lock is held, so the writer sees
//! them in mutation order. [`TagStore::flush`] waits for the queue to drain.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tagwriter_core::analytics::filter_tags;
use tagwriter_core::tier;
use tagwriter_core::{
    Inventory, InventoryStats, NewTag, PremiumFeature, TagQuery, TagRecord, TierState,
};
use tagwriter_db::SnapshotStore;

use crate::config::TagwriterConfig;
use crate::error::SessionResult;

enum SaveJob {
    Save(Inventory),
    Flush(oneshot::Sender<()>),
}

pub struct TagStore {
    inventory: Mutex<Inventory>,
    snapshots: Arc<dyn SnapshotStore>,
    save_tx: mpsc::UnboundedSender<SaveJob>,
    state_tx: watch::Sender<Inventory>,
    free_tag_cap: u32,
    recent_window: Duration,
}

impl TagStore {
    /// Loads the saved inventory and starts the persistence writer.
    ///
    /// The configured free cap replaces whatever cap was saved; the saved tag
    /// counter is kept as is.
    pub async fn open(snapshots: Arc<dyn SnapshotStore>, config: &TagwriterConfig) -> SessionResult<Self> {
        let mut inventory = snapshots.load().await?;

        let free_tag_cap = config.tier.free_tag_cap;
        let mut tier = inventory.tier().clone();
        tier.free_tag_cap = free_tag_cap;
        inventory.replace_tier(tier);

        info!(
            tags = inventory.total_count(),
            premium = inventory.tier().is_premium,
            free_tag_cap,
            "Tag store opened"
        );

        let (save_tx, save_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(Arc::clone(&snapshots), save_rx));

        let (state_tx, _) = watch::channel(inventory.clone());

        Ok(TagStore {
            inventory: Mutex::new(inventory),
            snapshots,
            save_tx,
            state_tx,
            free_tag_cap,
            recent_window: config.recent_window(),
        })
    }

    /// Queues a save and publishes. Call with the inventory lock held.
    fn commit(&self, inventory: &Inventory) {
        if self.save_tx.send(SaveJob::Save(inventory.clone())).is_err() {
            error!("Persistence writer is gone; change kept in memory only");
        }
        self.state_tx.send_replace(inventory.clone());
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a tag.
    ///
    /// ## Errors
    /// - `TierLimitExceeded` when a free account is at its cap
    /// - `PremiumFeatureRequired` when locking on a free account
    /// - `Validation` for a bad name or URL
    ///
    /// The inventory and storage are untouched on error.
    pub async fn add_tag(&self, draft: NewTag) -> SessionResult<TagRecord> {
        let mut inventory = self.inventory.lock().await;

        let record = inventory
            .add(draft, Uuid::new_v4().to_string(), Utc::now())
            .map_err(|e| {
                warn!(error = %e, "Tag creation rejected");
                e
            })?;

        debug!(id = %record.id, tag_type = %record.tag_type, "Tag created");
        self.commit(&inventory);
        Ok(record)
    }

    /// Replaces the stored record with the same id. `Ok(false)` if none.
    pub async fn update_tag(&self, record: TagRecord) -> SessionResult<bool> {
        let mut inventory = self.inventory.lock().await;
        let id = record.id.clone();

        let updated = inventory.update(record).map_err(|e| {
            warn!(id = %id, error = %e, "Tag update rejected");
            e
        })?;

        if updated {
            debug!(id = %id, "Tag updated");
            self.commit(&inventory);
        }
        Ok(updated)
    }

    /// Removes a tag. Returns whether one was removed.
    pub async fn delete_tag(&self, id: &str) -> bool {
        let mut inventory = self.inventory.lock().await;

        let removed = inventory.delete(id);
        if removed {
            debug!(id = %id, remaining = inventory.total_count(), "Tag deleted");
            self.commit(&inventory);
        }
        removed
    }

    /// Counts a tap on a tag.
    pub async fn record_access(&self, id: &str) -> bool {
        let mut inventory = self.inventory.lock().await;

        let found = inventory.record_access(id, Utc::now());
        if found {
            self.commit(&inventory);
        }
        found
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    pub async fn purchase_premium(&self) -> TierState {
        let mut inventory = self.inventory.lock().await;
        inventory.activate_premium();
        info!("Premium activated");
        self.commit(&inventory);
        inventory.tier().clone()
    }

    pub async fn cancel_subscription(&self) -> TierState {
        let mut inventory = self.inventory.lock().await;
        inventory.cancel_premium();
        info!("Premium cancelled");
        self.commit(&inventory);
        inventory.tier().clone()
    }

    /// The store reported the subscription lapsed. Locked tags stay locked;
    /// new locks and tags over the free cap are refused again.
    pub async fn expire_subscription(&self) -> TierState {
        let mut inventory = self.inventory.lock().await;
        inventory.expire_premium();
        info!(tags = inventory.total_count(), "Premium expired");
        self.commit(&inventory);
        inventory.tier().clone()
    }

    /// Re-reads the saved tier state and adopts it.
    ///
    /// Pending saves are flushed first so the read sees this session's own
    /// writes. Nothing changes when no tier state was ever saved.
    pub async fn restore_purchases(&self) -> SessionResult<TierState> {
        self.flush().await?;

        let saved = self.snapshots.load_tier().await?;
        let mut inventory = self.inventory.lock().await;

        if let Some(mut tier) = saved {
            tier.free_tag_cap = self.free_tag_cap;
            if &tier != inventory.tier() {
                info!(premium = tier.is_premium, "Restored tier state");
                inventory.replace_tier(tier);
                self.commit(&inventory);
            }
        }

        Ok(inventory.tier().clone())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn records(&self) -> Vec<TagRecord> {
        self.inventory.lock().await.records().to_vec()
    }

    pub async fn get(&self, id: &str) -> Option<TagRecord> {
        self.inventory.lock().await.get(id).cloned()
    }

    pub async fn tier(&self) -> TierState {
        self.inventory.lock().await.tier().clone()
    }

    pub async fn total_count(&self) -> usize {
        self.inventory.lock().await.total_count()
    }

    pub async fn locked_count(&self) -> usize {
        self.inventory.lock().await.locked_count()
    }

    pub async fn most_used(&self) -> Option<TagRecord> {
        self.inventory.lock().await.most_used().cloned()
    }

    pub async fn stats(&self) -> InventoryStats {
        self.inventory.lock().await.stats()
    }

    /// Tag list search, newest first.
    pub async fn search(&self, query: &TagQuery) -> Vec<TagRecord> {
        let inventory = self.inventory.lock().await;
        filter_tags(inventory.records(), query, Utc::now(), self.recent_window)
    }

    pub async fn can_create(&self) -> bool {
        tier::can_create(self.inventory.lock().await.tier())
    }

    pub async fn can_lock(&self) -> bool {
        tier::can_lock(self.inventory.lock().await.tier())
    }

    pub async fn allows(&self, feature: PremiumFeature) -> bool {
        tier::allows(self.inventory.lock().await.tier(), feature)
    }

    /// Receives the inventory after every change.
    pub fn subscribe(&self) -> watch::Receiver<Inventory> {
        self.state_tx.subscribe()
    }

    /// Waits until every queued save has been attempted.
    pub async fn flush(&self) -> SessionResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.save_tx.send(SaveJob::Flush(done_tx))?;
        done_rx.await?;
        Ok(())
    }
}

/// Saves snapshots one at a time, in the order they were queued.
async fn run_writer(snapshots: Arc<dyn SnapshotStore>, mut save_rx: mpsc::UnboundedReceiver<SaveJob>) {
    debug!("Persistence writer started");

    while let Some(job) = save_rx.recv().await {
        match job {
            SaveJob::Save(inventory) => {
                if let Err(e) = snapshots.save(&inventory).await {
                    error!(
                        error = %e,
                        tags = inventory.total_count(),
                        "Failed to persist inventory"
                    );
                }
            }
            SaveJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!("Persistence writer stopped");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use tagwriter_core::{CoreError, TagFilter, TagType};
    use tagwriter_db::snapshot::{TAGS_KEY, TIER_KEY};
    use tagwriter_db::MemorySnapshotStore;

    fn draft(n: usize) -> NewTag {
        NewTag::new(format!("Tag {n}"), format!("https://example.com/{n}"), TagType::Ntag215)
    }

    async fn open_with(memory: Arc<MemorySnapshotStore>) -> TagStore {
        TagStore::open(memory, &TagwriterConfig::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_persists_and_publishes() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;
        let mut updates = store.subscribe();

        let record = store.add_tag(draft(1).notes("Lobby")).await.unwrap();
        store.flush().await.unwrap();

        assert_eq!(memory.save_count(), 1);
        assert!(memory.raw(TAGS_KEY).await.unwrap().contains(&record.id));

        assert!(updates.has_changed().unwrap());
        let published = updates.borrow_and_update().clone();
        assert_eq!(published.total_count(), 1);
        assert_eq!(published.tier().tag_count, 1);
    }

    #[tokio::test]
    async fn test_free_cap_leaves_storage_untouched() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;

        for n in 0..10 {
            store.add_tag(draft(n)).await.unwrap();
        }
        store.flush().await.unwrap();

        let tags_before = memory.raw(TAGS_KEY).await;
        let tier_before = memory.raw(TIER_KEY).await;
        let saves_before = memory.save_count();

        let err = store.add_tag(draft(10)).await.unwrap_err();
        assert!(err.needs_premium());
        assert!(matches!(
            err,
            SessionError::Rejected(CoreError::TierLimitExceeded { cap: 10 })
        ));
        store.flush().await.unwrap();

        assert_eq!(store.total_count().await, 10);
        assert_eq!(memory.save_count(), saves_before);
        assert_eq!(memory.raw(TAGS_KEY).await, tags_before);
        assert_eq!(memory.raw(TIER_KEY).await, tier_before);
        assert!(!store.can_create().await);
    }

    #[tokio::test]
    async fn test_configured_cap_replaces_saved_cap() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let mut config = TagwriterConfig::default();
        config.tier.free_tag_cap = 2;

        let store = TagStore::open(memory, &config).await.unwrap();
        store.add_tag(draft(1)).await.unwrap();
        store.add_tag(draft(2)).await.unwrap();

        let err = store.add_tag(draft(3)).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Rejected(CoreError::TierLimitExceeded { cap: 2 })
        ));
    }

    #[tokio::test]
    async fn test_locking_needs_premium() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;

        let err = store.add_tag(draft(1).locked(true)).await.unwrap_err();
        assert!(err.needs_premium());
        assert_eq!(store.total_count().await, 0);
        assert!(!store.can_lock().await);

        store.purchase_premium().await;
        let record = store.add_tag(draft(1).locked(true).password("1234")).await.unwrap();
        assert!(record.is_locked);
        assert_eq!(store.locked_count().await, 1);
        assert!(store.allows(PremiumFeature::TagLocking).await);
    }

    #[tokio::test]
    async fn test_update_cannot_lock_on_free_tier() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory).await;

        let mut record = store.add_tag(draft(1)).await.unwrap();
        record.name = "Renamed".to_string();
        assert!(store.update_tag(record.clone()).await.unwrap());
        assert_eq!(store.get(&record.id).await.unwrap().name, "Renamed");

        record.is_locked = true;
        record.security_level = tagwriter_core::SecurityLevel::Locked;
        assert!(store.update_tag(record.clone()).await.unwrap_err().needs_premium());
        assert!(!store.get(&record.id).await.unwrap().is_locked);

        record.id = "missing".to_string();
        record.is_locked = false;
        record.security_level = tagwriter_core::SecurityLevel::Unlocked;
        assert!(!store.update_tag(record).await.unwrap());
    }

    #[tokio::test]
    async fn test_double_delete_is_noop() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;

        let record = store.add_tag(draft(1)).await.unwrap();
        assert!(store.delete_tag(&record.id).await);
        assert!(!store.delete_tag(&record.id).await);
        store.flush().await.unwrap();

        assert_eq!(memory.save_count(), 2);
        assert_eq!(store.tier().await.tag_count, 0);
        assert_eq!(store.total_count().await, 0);
    }

    #[tokio::test]
    async fn test_record_access_updates_most_used() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory).await;

        let first = store.add_tag(draft(1)).await.unwrap();
        let second = store.add_tag(draft(2)).await.unwrap();

        assert!(store.record_access(&second.id).await);
        assert!(store.record_access(&second.id).await);
        assert!(store.record_access(&first.id).await);
        assert!(!store.record_access("missing").await);

        let top = store.most_used().await.unwrap();
        assert_eq!(top.id, second.id);
        assert_eq!(top.access_count, 2);
        assert!(top.last_accessed.is_some());
        assert_eq!(store.stats().await.total_accesses, 3);
    }

    #[tokio::test]
    async fn test_failed_save_is_not_an_error() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;
        memory.set_failing(true);

        let record = store.add_tag(draft(1)).await.unwrap();
        store.flush().await.unwrap();

        assert_eq!(memory.save_count(), 0);
        assert!(memory.raw(TAGS_KEY).await.is_none());
        assert_eq!(store.get(&record.id).await.unwrap().id, record.id);

        memory.set_failing(false);
        store.record_access(&record.id).await;
        store.flush().await.unwrap();
        assert_eq!(memory.save_count(), 1);
    }

    #[tokio::test]
    async fn test_reopen_restores_inventory() {
        let memory = Arc::new(MemorySnapshotStore::new());
        {
            let store = open_with(memory.clone()).await;
            store.add_tag(draft(1)).await.unwrap();
            store.purchase_premium().await;
            store.flush().await.unwrap();
        }

        let store = open_with(memory).await;
        assert_eq!(store.total_count().await, 1);
        assert!(store.tier().await.is_premium);
    }

    #[tokio::test]
    async fn test_corrupt_tag_blob_keeps_premium() {
        let memory = Arc::new(MemorySnapshotStore::new());
        {
            let store = open_with(memory.clone()).await;
            store.add_tag(draft(1)).await.unwrap();
            store.purchase_premium().await;
            store.flush().await.unwrap();
        }
        memory.put_raw(TAGS_KEY, "[{\"id\": 1").await;

        let store = open_with(memory).await;
        assert_eq!(store.total_count().await, 0);
        let tier = store.tier().await;
        assert!(tier.is_premium);
        assert_eq!(tier.tag_count, 1);
    }

    #[tokio::test]
    async fn test_oversized_recent_window_does_not_panic() {
        for days in [1_000_000_000, i64::MAX / 2] {
            let memory = Arc::new(MemorySnapshotStore::new());
            let mut config = TagwriterConfig::default();
            config.inventory.recent_window_days = days;

            let store = TagStore::open(memory, &config).await.unwrap();
            store.add_tag(draft(1)).await.unwrap();

            let recent = store
                .search(&TagQuery {
                    search: String::new(),
                    filter: TagFilter::Recent,
                })
                .await;
            assert_eq!(recent.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_restore_purchases_adopts_saved_tier() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;
        store.add_tag(draft(1)).await.unwrap();
        store.flush().await.unwrap();

        let mut premium = store.tier().await;
        premium.activate_premium();
        memory
            .put_raw(TIER_KEY, serde_json::to_string(&premium).unwrap())
            .await;

        let restored = store.restore_purchases().await.unwrap();
        assert!(restored.is_premium);
        assert_eq!(restored.free_tag_cap, 10);
        assert!(store.can_lock().await);

        let cancelled = store.cancel_subscription().await;
        assert!(!cancelled.is_premium);
    }

    #[tokio::test]
    async fn test_expired_subscription_regates_features() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let mut config = TagwriterConfig::default();
        config.tier.free_tag_cap = 1;
        let store = TagStore::open(memory.clone(), &config).await.unwrap();

        store.purchase_premium().await;
        let locked = store.add_tag(draft(1).locked(true)).await.unwrap();
        store.add_tag(draft(2)).await.unwrap();

        let tier = store.expire_subscription().await;
        assert!(!tier.is_premium);
        assert_eq!(tier.subscription, tagwriter_core::SubscriptionStatus::Expired);
        assert!(store.get(&locked.id).await.unwrap().is_locked);
        assert!(store.add_tag(draft(3)).await.unwrap_err().needs_premium());

        store.flush().await.unwrap();
        assert!(memory.raw(TIER_KEY).await.unwrap().contains("expired"));
    }

    #[tokio::test]
    async fn test_restore_without_saved_tier_keeps_current() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory.clone()).await;

        let tier = store.restore_purchases().await.unwrap();
        assert_eq!(tier, store.tier().await);
        assert_eq!(memory.save_count(), 0);
    }

    #[tokio::test]
    async fn test_search_filters_and_orders() {
        let memory = Arc::new(MemorySnapshotStore::new());
        let store = open_with(memory).await;
        store.purchase_premium().await;

        store.add_tag(draft(1).notes("coffee menu")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.add_tag(draft(2).locked(true)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let newest = store.add_tag(draft(3)).await.unwrap();

        let all = store.search(&TagQuery::default()).await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, newest.id);

        let coffee = store
            .search(&TagQuery {
                search: "COFFEE".to_string(),
                filter: TagFilter::All,
            })
            .await;
        assert_eq!(coffee.len(), 1);

        let locked = store
            .search(&TagQuery {
                search: String::new(),
                filter: TagFilter::Locked,
            })
            .await;
        assert_eq!(locked.len(), 1);
        assert!(locked[0].is_locked);

        let recent = store
            .search(&TagQuery {
                search: String::new(),
                filter: TagFilter::Recent,
            })
            .await;
        assert_eq!(recent.len(), 3);
    }
}
