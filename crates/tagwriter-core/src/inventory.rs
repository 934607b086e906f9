//! # Inventory Model
//!
//! The tag list and tier counter as one in-memory value, plus the rules for
//! changing them. Pure: ids and timestamps come from the caller, and
//! persistence is somebody else's job (see `tagwriter-session`).
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(draft)                                                             │
//! │    ├── !premium && count >= cap ──► Err(TierLimitExceeded)  unchanged   │
//! │    ├── should_lock && !premium ───► Err(PremiumFeatureRequired)         │
//! │    ├── invalid name / url ────────► Err(Validation)                     │
//! │    └── push record, count += 1 ───► Ok(record)                          │
//! │                                                                         │
//! │  update(record)   no id match ──► Ok(false), nothing touched            │
//! │  delete(id)       no id match ──► false, counter untouched              │
//! │                   match ────────► remove, count = max(0, count - 1)     │
//! │  record_access    no id match ──► false                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Insertion order is creation order and is kept across every operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::analytics::{self, InventoryStats};
use crate::error::{CoreError, CoreResult};
use crate::tier::{self, PremiumFeature};
use crate::types::{NewTag, TagRecord, TierState};
use crate::validation::{validate_new_tag, validate_record};

/// Tag records and tier state. Also the persisted snapshot shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Inventory {
    records: Vec<TagRecord>,
    tier: TierState,
}

impl Inventory {
    /// An empty inventory for the given tier.
    pub fn new(tier: TierState) -> Self {
        Inventory {
            records: Vec::new(),
            tier,
        }
    }

    /// Reassembles an inventory from separately persisted parts.
    ///
    /// `tier.tag_count` is taken as stored, not recomputed from `records`.
    pub fn from_parts(records: Vec<TagRecord>, tier: TierState) -> Self {
        Inventory { records, tier }
    }

    pub fn records(&self) -> &[TagRecord] {
        &self.records
    }

    pub fn tier(&self) -> &TierState {
        &self.tier
    }

    pub fn get(&self, id: &str) -> Option<&TagRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a tag if the tier allows it.
    ///
    /// On any error the inventory is left exactly as it was.
    pub fn add(&mut self, draft: NewTag, id: String, now: DateTime<Utc>) -> CoreResult<TagRecord> {
        if !tier::can_create(&self.tier) {
            return Err(CoreError::TierLimitExceeded {
                cap: self.tier.free_tag_cap,
            });
        }

        if draft.should_lock && !tier::can_lock(&self.tier) {
            return Err(CoreError::PremiumFeatureRequired {
                feature: PremiumFeature::TagLocking,
            });
        }

        let draft = validate_new_tag(draft)?;
        let record = TagRecord::from_new(draft, id, now);

        self.records.push(record.clone());
        self.tier.increment_count();

        Ok(record)
    }

    /// Replaces the record with the same id.
    ///
    /// Returns `Ok(false)` without touching anything when no record matches.
    pub fn update(&mut self, record: TagRecord) -> CoreResult<bool> {
        let Some(index) = self.position(&record.id) else {
            return Ok(false);
        };

        validate_record(&record)?;

        if record.is_locked && !self.records[index].is_locked && !tier::can_lock(&self.tier) {
            return Err(CoreError::PremiumFeatureRequired {
                feature: PremiumFeature::TagLocking,
            });
        }

        self.records[index] = record;
        Ok(true)
    }

    /// Removes the record with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.records.remove(index);
                self.tier.decrement_count();
                true
            }
            None => false,
        }
    }

    /// Stamps an access on the record with `id`.
    pub fn record_access(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.touch(now);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    pub fn activate_premium(&mut self) {
        self.tier.activate_premium();
    }

    pub fn cancel_premium(&mut self) {
        self.tier.cancel_premium();
    }

    pub fn expire_premium(&mut self) {
        self.tier.expire_premium();
    }

    /// Swaps in a tier state restored from storage, keeping the records.
    pub fn replace_tier(&mut self, tier: TierState) {
        self.tier = tier;
    }

    // =========================================================================
    // Derived Views
    // =========================================================================

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn locked_count(&self) -> usize {
        analytics::locked_count(&self.records)
    }

    pub fn most_used(&self) -> Option<&TagRecord> {
        analytics::most_used(&self.records)
    }

    pub fn stats(&self) -> InventoryStats {
        InventoryStats::from_records(&self.records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
