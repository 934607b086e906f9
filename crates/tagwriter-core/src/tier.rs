//! # Tier Policy
//!
//! Pure decisions over [`TierState`]. Nothing here mutates.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  can_create(state) = premium || tag_count < free_tag_cap     │
//! │  can_lock(state)   = premium                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UI consults these before offering an action; the inventory checks
//! them again before mutating.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::TierState;

/// Features gated behind a premium subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PremiumFeature {
    UnlimitedTags,
    TagLocking,
    AdvancedAnalytics,
    CloudSync,
}

impl std::fmt::Display for PremiumFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PremiumFeature::UnlimitedTags => write!(f, "Unlimited tags"),
            PremiumFeature::TagLocking => write!(f, "Tag locking"),
            PremiumFeature::AdvancedAnalytics => write!(f, "Advanced analytics"),
            PremiumFeature::CloudSync => write!(f, "Cloud sync"),
        }
    }
}

/// Whether another tag may be created.
#[inline]
pub fn can_create(state: &TierState) -> bool {
    state.is_premium || state.tag_count < state.free_tag_cap
}

/// Whether tags may be locked.
#[inline]
pub fn can_lock(state: &TierState) -> bool {
    state.is_premium
}

/// Whether `feature` is available. Every gated feature needs premium today.
pub fn allows(state: &TierState, feature: PremiumFeature) -> bool {
    match feature {
        PremiumFeature::UnlimitedTags
        | PremiumFeature::TagLocking
        | PremiumFeature::AdvancedAnalytics
        | PremiumFeature::CloudSync => state.is_premium,
    }
}

/// Free slots left, `None` for premium accounts (no cap).
pub fn remaining_free_slots(state: &TierState) -> Option<u32> {
    if state.is_premium {
        None
    } else {
        Some(state.free_tag_cap.saturating_sub(state.tag_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_with(count: u32) -> TierState {
        TierState {
            tag_count: count,
            ..TierState::free(10)
        }
    }

    #[test]
    fn test_can_create_at_boundary() {
        assert!(can_create(&free_with(9)));
        assert!(!can_create(&free_with(10)));
        assert!(!can_create(&free_with(11)));

        let mut premium = free_with(500);
        premium.activate_premium();
        assert!(can_create(&premium));
    }

    #[test]
    fn test_can_lock_requires_premium() {
        let mut tier = free_with(0);
        assert!(!can_lock(&tier));
        tier.activate_premium();
        assert!(can_lock(&tier));
        assert!(allows(&tier, PremiumFeature::CloudSync));
    }

    #[test]
    fn test_remaining_slots() {
        assert_eq!(remaining_free_slots(&free_with(3)), Some(7));
        assert_eq!(remaining_free_slots(&free_with(12)), Some(0));

        let mut premium = free_with(3);
        premium.activate_premium();
        assert_eq!(remaining_free_slots(&premium), None);
    }
}
