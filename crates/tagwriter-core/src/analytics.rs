//! # Inventory Analytics
//!
//! Read-only views over a slice of tag records: counts, the most used tag,
//! per-type grouping, security breakdown, and the search/filter used by the
//! tag list.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{SecurityLevel, TagRecord, TagType};
use crate::RECENT_TAGS_LIMIT;

// =============================================================================
// Counters
// =============================================================================

pub fn locked_count(records: &[TagRecord]) -> usize {
    records.iter().filter(|r| r.is_locked).count()
}

/// The record with the highest access count.
///
/// Ties go to the earliest record in insertion order.
pub fn most_used(records: &[TagRecord]) -> Option<&TagRecord> {
    records.iter().fold(None, |best: Option<&TagRecord>, record| match best {
        Some(current) if current.access_count >= record.access_count => Some(current),
        _ => Some(record),
    })
}

pub fn counts_by_type(records: &[TagRecord]) -> BTreeMap<TagType, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.tag_type).or_insert(0) += 1;
    }
    counts
}

pub fn total_accesses(records: &[TagRecord]) -> u64 {
    records.iter().map(|r| r.access_count).sum()
}

/// Up to `limit` records, newest first.
pub fn most_recent(records: &[TagRecord], limit: usize) -> Vec<TagRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

// =============================================================================
// Security Breakdown
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SecurityBreakdown {
    pub unlocked: usize,
    pub locked: usize,
    pub password_protected: usize,
}

impl SecurityBreakdown {
    pub fn from_records(records: &[TagRecord]) -> Self {
        let mut breakdown = SecurityBreakdown::default();
        for record in records {
            if !record.is_locked {
                breakdown.unlocked += 1;
            } else if record.security_level == SecurityLevel::Locked {
                breakdown.locked += 1;
            }
            if record.security_level == SecurityLevel::PasswordProtected {
                breakdown.password_protected += 1;
            }
        }
        breakdown
    }
}

// =============================================================================
// Dashboard Summary
// =============================================================================

/// Everything the analytics screen renders, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryStats {
    pub total: usize,
    pub locked: usize,
    pub total_accesses: u64,
    pub most_used: Option<TagRecord>,
    pub by_type: BTreeMap<TagType, usize>,
    pub security: SecurityBreakdown,
    pub recent: Vec<TagRecord>,
}

impl InventoryStats {
    pub fn from_records(records: &[TagRecord]) -> Self {
        InventoryStats {
            total: records.len(),
            locked: locked_count(records),
            total_accesses: total_accesses(records),
            most_used: most_used(records).cloned(),
            by_type: counts_by_type(records),
            security: SecurityBreakdown::from_records(records),
            recent: most_recent(records, RECENT_TAGS_LIMIT),
        }
    }
}

// =============================================================================
// Search & Filter
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TagFilter {
    #[default]
    All,
    Locked,
    Unlocked,
    /// Created within the recent window.
    Recent,
}

/// A tag list query: free-text search plus a filter chip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TagQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filter: TagFilter,
}

impl TagQuery {
    fn matches_search(&self, record: &TagRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&record.name, &record.url, &record.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// `recent_cutoff` is `None` when the window reaches past the earliest
    /// representable time, so every record counts as recent.
    fn matches_filter(&self, record: &TagRecord, recent_cutoff: Option<DateTime<Utc>>) -> bool {
        match self.filter {
            TagFilter::All => true,
            TagFilter::Locked => record.is_locked,
            TagFilter::Unlocked => !record.is_locked,
            TagFilter::Recent => recent_cutoff.map_or(true, |cutoff| record.created_at > cutoff),
        }
    }
}

/// Applies `query` and returns matches newest first.
pub fn filter_tags(
    records: &[TagRecord],
    query: &TagQuery,
    now: DateTime<Utc>,
    recent_window: Duration,
) -> Vec<TagRecord> {
    let cutoff = now.checked_sub_signed(recent_window);
    let mut matches: Vec<TagRecord> = records
        .iter()
        .filter(|r| query.matches_search(r) && query.matches_filter(r, cutoff))
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matches
}

// =============================================================================
// Unit Tests
// =============================================================================
