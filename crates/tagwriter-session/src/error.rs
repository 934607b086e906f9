//! # Session Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌──────────────────┐  ┌───────────────────────┐   │
//! │  │  Configuration  │  │  Session actions │  │  Inventory            │   │
//! │  │                 │  │                  │  │                       │   │
//! │  │  InvalidConfig  │  │  InvalidTransit. │  │  Rejected(CoreError)  │   │
//! │  │  ConfigLoad...  │  │  ShuttingDown    │  │  Storage              │   │
//! │  └─────────────────┘  └──────────────────┘  └───────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Write and camera failures are not errors here. They end the session in
//! `Failed(reason)` and show up in the published state.

use tagwriter_core::{CoreError, InvalidTransition};
use thiserror::Error;

/// Result type for session and store operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// A user action that the current session state does not allow.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// The controller or store task has stopped.
    #[error("Session is shutting down")]
    ShuttingDown,

    // =========================================================================
    // Inventory Errors
    // =========================================================================
    /// The inventory refused the mutation and is unchanged.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Reading persisted state failed. Saves never produce this.
    #[error("Storage error: {0}")]
    Storage(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<InvalidTransition> for SessionError {
    fn from(err: InvalidTransition) -> Self {
        SessionError::InvalidTransition {
            state: err.state,
            action: err.action,
        }
    }
}

impl From<tagwriter_db::DbError> for SessionError {
    fn from(err: tagwriter_db::DbError) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for SessionError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        SessionError::ShuttingDown
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for SessionError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        SessionError::ShuttingDown
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SessionError {
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }

    /// True when the UI should explain the refusal and offer an upgrade.
    pub fn needs_premium(&self) -> bool {
        matches!(
            self,
            SessionError::Rejected(
                CoreError::TierLimitExceeded { .. } | CoreError::PremiumFeatureRequired { .. }
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagwriter_core::PremiumFeature;

    #[test]
    fn test_tier_rejections_need_premium() {
        assert!(SessionError::from(CoreError::TierLimitExceeded { cap: 10 }).needs_premium());
        assert!(SessionError::from(CoreError::PremiumFeatureRequired {
            feature: PremiumFeature::TagLocking
        })
        .needs_premium());
        assert!(!SessionError::ShuttingDown.needs_premium());
    }

    #[test]
    fn test_transition_message() {
        let err = SessionError::from(InvalidTransition {
            state: "writing",
            action: "reset",
        });
        assert_eq!(err.to_string(), "Cannot reset while writing");
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_rejection_is_transparent() {
        let err = SessionError::from(CoreError::TierLimitExceeded { cap: 3 });
        assert_eq!(
            err.to_string(),
            "You've reached your free limit of 3 tags. Upgrade to Premium for unlimited tags."
        );
    }
}
