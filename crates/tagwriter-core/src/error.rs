//! # Error Types
//!
//! Domain-specific error types for tagwriter-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tagwriter-core errors (this file)                                      │
//! │  ├── CoreError        - Inventory rule violations (tier, premium)       │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  tagwriter-core session taxonomy (session.rs)                           │
//! │  └── FailureReason    - Why a scan-to-write session ended in Failed     │
//! │                                                                         │
//! │  tagwriter-db errors (separate crate)                                   │
//! │  └── DbError          - Storage failures (logged, never surfaced)       │
//! │                                                                         │
//! │  tagwriter-session errors (separate crate)                              │
//! │  └── SessionError     - Rejected controller calls                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (cap, field, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing notice

use thiserror::Error;

use crate::tier::PremiumFeature;

// =============================================================================
// Core Error
// =============================================================================

/// Inventory-level errors.
///
/// These reject a single inventory operation. They never touch the state of
/// an in-flight scan session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The free tier already holds as many tags as it may.
    ///
    /// ## When This Occurs
    /// - `add_tag` on a free account with `tag_count >= free_tag_cap`
    #[error("You've reached your free limit of {cap} tags. Upgrade to Premium for unlimited tags.")]
    TierLimitExceeded { cap: u32 },

    /// The requested operation needs a premium subscription.
    ///
    /// ## When This Occurs
    /// - Creating a locked tag on a free account
    /// - Editing an unlocked tag into a locked one on a free account
    #[error("{feature} is a premium feature. Upgrade to Premium to use it.")]
    PremiumFeatureRequired { feature: PremiumFeature },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., unparseable URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A record's fields contradict each other.
    #[error("inconsistent tag record: {reason}")]
    Inconsistent { reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
