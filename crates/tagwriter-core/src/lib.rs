//! # tagwriter-core: Pure Domain Logic for Tagwriter
//!
//! Everything the tag writer decides, with no I/O. The async crates above
//! this one own storage, hardware capabilities and concurrency.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tagwriter Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       UI Layer                                  │   │
//! │  │    Scan screen ──► Write prompt ──► Tag list ──► Analytics      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              tagwriter-session (tokio actors)                   │   │
//! │  │    SessionController, TagStore, config, tracing                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tagwriter-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌──────┐ ┌───────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │validation│ │ tier │ │ inventory │ │ session │  │   │
//! │  │   └─────────┘ └──────────┘ └──────┘ └───────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO HARDWARE • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Tag records, tag types, security levels, tier state
//! - [`validation`] - Scan payload and tag field checks
//! - [`tier`] - Free/premium policy
//! - [`inventory`] - The tag list plus its mutation rules
//! - [`analytics`] - Counts, most used tag, search and filters
//! - [`session`] - The scan-to-write state machine
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use tagwriter_core::{Inventory, NewTag, TagType, TierState};
//!
//! let mut inventory = Inventory::new(TierState::free(1));
//! let tag = NewTag::new("Menu", "https://cafe.example/menu", TagType::Ntag215);
//! inventory.add(tag, "tag-1".to_string(), Utc::now()).unwrap();
//!
//! // The free cap is reached; the next add is refused.
//! let tag = NewTag::new("Wifi", "https://cafe.example/wifi", TagType::Ntag213);
//! assert!(inventory.add(tag, "tag-2".to_string(), Utc::now()).is_err());
//! assert_eq!(inventory.tier().tag_count, 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod inventory;
pub mod session;
pub mod tier;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{InventoryStats, SecurityBreakdown, TagFilter, TagQuery};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::Inventory;
pub use session::{
    CameraAuthorization, Effect, FailureReason, InvalidTransition, Notice, SessionEvent,
    SessionMachine, SessionSnapshot, SessionState, TagWriteBlock, WriteFailure, WriteOutcome,
};
pub use tier::PremiumFeature;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tags a free account may hold.
pub const DEFAULT_FREE_TAG_CAP: u32 = 10;

/// Longest tag display name, in characters.
pub const MAX_TAG_NAME_LEN: usize = 100;

/// How many tags the analytics "recent" list shows.
pub const RECENT_TAGS_LIMIT: usize = 5;

/// Age limit for the "Recent" filter chip.
pub const DEFAULT_RECENT_WINDOW_DAYS: i64 = 7;
