//! # Domain Types
//!
//! Core domain types for the tag inventory.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │   TagRecord     │   │    TagType      │   │ SecurityLevel   │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  NTAG213 (144B) │   │  Unlocked       │        │
//! │  │  name, url      │   │  NTAG215 (504B) │   │  Locked         │        │
//! │  │  tag_type       │   │  NTAG216 (924B) │   │  PasswordProt.  │        │
//! │  │  security_level │   │  NTAG210 (48B)  │   │  ReadOnly       │        │
//! │  │  access_count   │   │  MIFARE Classic │   └─────────────────┘        │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                          │
//! │  │   TierState     │   │ SubscriptionStatus  │                          │
//! │  │  ─────────────  │   │  ─────────────────  │                          │
//! │  │  is_premium     │   │  Free               │                          │
//! │  │  free_tag_cap   │   │  Premium            │                          │
//! │  │  tag_count      │   │  Expired            │                          │
//! │  └─────────────────┘   └─────────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record Invariants
//! - `is_locked` implies `security_level` is `Locked` or `PasswordProtected`
//! - `PasswordProtected` implies `password.is_some()`
//!
//! Both are established by [`TagRecord::from_new`] and re-checked by
//! [`crate::validation::validate_record`] before an edited record is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DEFAULT_FREE_TAG_CAP;

// =============================================================================
// Tag Type
// =============================================================================

/// Physical NFC chip variant. Each variant has a fixed user memory size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TagType {
    #[serde(rename = "NTAG213")]
    Ntag213,
    #[serde(rename = "NTAG215")]
    Ntag215,
    #[serde(rename = "NTAG216")]
    Ntag216,
    #[serde(rename = "NTAG210")]
    Ntag210,
    #[serde(rename = "MIFARE Classic")]
    MifareClassic,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl TagType {
    /// Every variant, in display order.
    pub const ALL: [TagType; 6] = [
        TagType::Ntag213,
        TagType::Ntag215,
        TagType::Ntag216,
        TagType::Ntag210,
        TagType::MifareClassic,
        TagType::Unknown,
    ];

    /// User memory in bytes, `None` when the chip is not identified.
    pub const fn capacity_bytes(&self) -> Option<u32> {
        match self {
            TagType::Ntag213 => Some(144),
            TagType::Ntag215 => Some(504),
            TagType::Ntag216 => Some(924),
            TagType::Ntag210 => Some(48),
            TagType::MifareClassic => Some(1024),
            TagType::Unknown => None,
        }
    }

    /// Human-readable capacity ("144 bytes", "1KB").
    pub fn capacity_label(&self) -> String {
        match self.capacity_bytes() {
            Some(1024) => "1KB".to_string(),
            Some(bytes) => format!("{} bytes", bytes),
            None => "Unknown".to_string(),
        }
    }

    /// Display name as printed on the chip packaging.
    pub const fn display_name(&self) -> &'static str {
        match self {
            TagType::Ntag213 => "NTAG213",
            TagType::Ntag215 => "NTAG215",
            TagType::Ntag216 => "NTAG216",
            TagType::Ntag210 => "NTAG210",
            TagType::MifareClassic => "MIFARE Classic",
            TagType::Unknown => "Unknown",
        }
    }
}

impl Default for TagType {
    fn default() -> Self {
        TagType::Ntag213
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// Security Level
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Unlocked,
    Locked,
    PasswordProtected,
    ReadOnly,
}

impl SecurityLevel {
    /// Derives the level for a new tag from the lock request.
    pub fn derive(should_lock: bool, has_password: bool) -> Self {
        match (should_lock, has_password) {
            (true, true) => SecurityLevel::PasswordProtected,
            (true, false) => SecurityLevel::Locked,
            (false, _) => SecurityLevel::Unlocked,
        }
    }

    /// Whether a tag at this level may carry `is_locked = true`.
    pub const fn permits_lock(&self) -> bool {
        matches!(self, SecurityLevel::Locked | SecurityLevel::PasswordProtected)
    }
}

impl Default for SecurityLevel {
    fn default() -> Self {
        SecurityLevel::Unlocked
    }
}

// =============================================================================
// Location
// =============================================================================

/// WGS84 coordinate captured when the tag was created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

// =============================================================================
// Tag Record
// =============================================================================

/// A tag in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TagRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Target URL written to the tag (http/https).
    pub url: String,

    /// Free-form notes, empty when none were given.
    #[serde(default)]
    pub notes: String,

    pub tag_type: TagType,

    pub security_level: SecurityLevel,

    /// Present whenever `security_level` is `PasswordProtected`.
    pub password: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub location: Option<GeoPoint>,

    pub location_name: Option<String>,

    pub is_locked: bool,

    #[ts(as = "Option<String>")]
    pub last_accessed: Option<DateTime<Utc>>,

    pub access_count: u64,
}

impl TagRecord {
    /// Builds a record from a validated creation request.
    ///
    /// The caller supplies identity and clock so this stays pure.
    pub fn from_new(draft: NewTag, id: String, now: DateTime<Utc>) -> Self {
        let security_level = SecurityLevel::derive(draft.should_lock, draft.password.is_some());

        TagRecord {
            id,
            name: draft.name,
            url: draft.url,
            notes: draft.notes,
            tag_type: draft.tag_type,
            security_level,
            password: draft.password,
            created_at: now,
            location: draft.location,
            location_name: draft.location_name,
            is_locked: draft.should_lock,
            last_accessed: None,
            access_count: 0,
        }
    }

    /// Stamps an access: bumps the counter and records the time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed = Some(now);
        self.access_count = self.access_count.saturating_add(1);
    }
}

// =============================================================================
// New Tag Request
// =============================================================================

/// Input for creating a tag. Name, URL and type are required.
///
/// ## Example
/// ```rust
/// use tagwriter_core::{NewTag, TagType};
///
/// let draft = NewTag::new("Front Desk", "https://example.com/menu", TagType::Ntag215)
///     .notes("Lobby stand")
///     .locked(true);
/// assert!(draft.should_lock);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTag {
    pub name: String,
    pub url: String,
    pub tag_type: TagType,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub should_lock: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub location_name: Option<String>,
}

impl NewTag {
    pub fn new(name: impl Into<String>, url: impl Into<String>, tag_type: TagType) -> Self {
        NewTag {
            name: name.into(),
            url: url.into(),
            tag_type,
            notes: String::new(),
            password: None,
            should_lock: false,
            location: None,
            location_name: None,
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn locked(mut self, should_lock: bool) -> Self {
        self.should_lock = should_lock;
        self
    }

    pub fn located(mut self, point: GeoPoint, label: Option<String>) -> Self {
        self.location = Some(point);
        self.location_name = label;
        self
    }
}

// =============================================================================
// Subscription Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Free,
    Premium,
    Expired,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        SubscriptionStatus::Free
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Free => write!(f, "free"),
            SubscriptionStatus::Premium => write!(f, "premium"),
            SubscriptionStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionStatus::Free),
            "premium" => Ok(SubscriptionStatus::Premium),
            "expired" => Ok(SubscriptionStatus::Expired),
            other => Err(format!(
                "Unknown subscription status: '{}'. Valid options: free, premium, expired",
                other
            )),
        }
    }
}

// =============================================================================
// Tier State
// =============================================================================

/// Account tier and the tag counter the free-tier cap is checked against.
///
/// `tag_count` mirrors the inventory size but is persisted on its own, so it
/// survives a record blob that fails to decode. `tag_count <= free_tag_cap`
/// is deliberately not enforced here; see [`crate::tier::can_create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierState {
    pub is_premium: bool,
    #[serde(default)]
    pub subscription: SubscriptionStatus,
    pub free_tag_cap: u32,
    pub tag_count: u32,
}

impl TierState {
    /// A free account with the given cap and no tags.
    pub fn free(free_tag_cap: u32) -> Self {
        TierState {
            is_premium: false,
            subscription: SubscriptionStatus::Free,
            free_tag_cap,
            tag_count: 0,
        }
    }

    pub fn activate_premium(&mut self) {
        self.is_premium = true;
        self.subscription = SubscriptionStatus::Premium;
    }

    pub fn cancel_premium(&mut self) {
        self.is_premium = false;
        self.subscription = SubscriptionStatus::Free;
    }

    pub fn expire_premium(&mut self) {
        self.is_premium = false;
        self.subscription = SubscriptionStatus::Expired;
    }

    pub fn increment_count(&mut self) {
        self.tag_count = self.tag_count.saturating_add(1);
    }

    /// Floors at zero, so a duplicate delete can never drive it negative.
    pub fn decrement_count(&mut self) {
        self.tag_count = self.tag_count.saturating_sub(1);
    }
}

impl Default for TierState {
    fn default() -> Self {
        TierState::free(DEFAULT_FREE_TAG_CAP)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_capacity() {
        assert_eq!(TagType::Ntag213.capacity_bytes(), Some(144));
        assert_eq!(TagType::Ntag213.capacity_label(), "144 bytes");
        assert_eq!(TagType::MifareClassic.capacity_label(), "1KB");
        assert_eq!(TagType::Unknown.capacity_bytes(), None);
        assert_eq!(TagType::default(), TagType::Ntag213);
    }

    #[test]
    fn test_tag_type_serializes_as_chip_name() {
        let json = serde_json::to_string(&TagType::MifareClassic).unwrap();
        assert_eq!(json, "\"MIFARE Classic\"");
        let parsed: TagType = serde_json::from_str("\"NTAG216\"").unwrap();
        assert_eq!(parsed, TagType::Ntag216);
    }

    #[test]
    fn test_security_level_derivation() {
        assert_eq!(SecurityLevel::derive(true, true), SecurityLevel::PasswordProtected);
        assert_eq!(SecurityLevel::derive(true, false), SecurityLevel::Locked);
        assert_eq!(SecurityLevel::derive(false, true), SecurityLevel::Unlocked);
        assert!(!SecurityLevel::ReadOnly.permits_lock());
    }

    #[test]
    fn test_from_new_locked_with_password() {
        let draft = NewTag::new("Card", "https://x.com", TagType::Ntag213)
            .password("1234")
            .locked(true);
        let now = Utc::now();
        let record = TagRecord::from_new(draft, "id-1".to_string(), now);

        assert!(record.is_locked);
        assert_eq!(record.security_level, SecurityLevel::PasswordProtected);
        assert_eq!(record.password.as_deref(), Some("1234"));
        assert_eq!(record.created_at, now);
        assert_eq!(record.access_count, 0);
    }

    #[test]
    fn test_touch_increments_counter() {
        let draft = NewTag::new("Card", "https://x.com", TagType::Ntag213);
        let mut record = TagRecord::from_new(draft, "id-1".to_string(), Utc::now());
        let later = Utc::now();
        record.touch(later);
        record.touch(later);
        assert_eq!(record.access_count, 2);
        assert_eq!(record.last_accessed, Some(later));
    }

    #[test]
    fn test_tier_counter_floors_at_zero() {
        let mut tier = TierState::default();
        assert_eq!(tier.free_tag_cap, DEFAULT_FREE_TAG_CAP);
        tier.decrement_count();
        assert_eq!(tier.tag_count, 0);
        tier.increment_count();
        tier.decrement_count();
        tier.decrement_count();
        assert_eq!(tier.tag_count, 0);
    }

    #[test]
    fn test_subscription_transitions() {
        let mut tier = TierState::default();
        tier.activate_premium();
        assert!(tier.is_premium);
        assert_eq!(tier.subscription, SubscriptionStatus::Premium);
        tier.expire_premium();
        assert!(!tier.is_premium);
        assert_eq!(tier.subscription, SubscriptionStatus::Expired);
        assert_eq!("premium".parse::<SubscriptionStatus>(), Ok(SubscriptionStatus::Premium));
        assert!("gold".parse::<SubscriptionStatus>().is_err());
    }
}
