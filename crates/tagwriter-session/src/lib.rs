//! # tagwriter-session: Scan Sessions and the Live Inventory
//!
//! Runs the QR-scan-to-NFC-write session and owns the tag inventory while
//! the app is open.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   UI ──commands──► SessionHandle ──mpsc──► SessionController task       │
//! │    ▲                                        │  SessionMachine (core)    │
//! │    │                                        │                           │
//! │    ├──── watch<SessionSnapshot> ◄───────────┤                           │
//! │    ├──── broadcast<Notice> ◄────────────────┤                           │
//! │    │                                        ▼                           │
//! │    │                          CameraAccess / BarcodeScanner / NfcWriter │
//! │    │                                  (capability.rs, injected)         │
//! │    │                                                                    │
//! │   UI ──mutations──► TagStore ──► Inventory (core)                       │
//! │    ▲                   │                                                │
//! │    └── watch<Inventory>┤                                                │
//! │                        ▼                                                │
//! │                  writer task ──► SnapshotStore (tagwriter-db)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session and the inventory do not talk to each other. Writing a tag
//! never creates an inventory record; the UI decides whether to save one.
//!
//! ## Module Organization
//! - [`capability`] - Camera, scanner and NFC traits plus callback plumbing
//! - [`config`] - TOML configuration with environment overrides
//! - [`controller`] - Session actor and its handle
//! - [`error`] - Session error types
//! - [`store`] - Inventory store with background persistence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagwriter_session::{open_inventory, Capabilities, SessionController, TagwriterConfig};
//!
//! tagwriter_session::init_tracing();
//! let config = TagwriterConfig::load_or_default(None);
//!
//! let store = open_inventory(&config).await?;
//! let (session, _task) = SessionController::start(capabilities, &config.session);
//!
//! session.start_scanning().await?;
//! let mut updates = session.subscribe();
//! ```

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use tagwriter_db::{Database, DbConfig};

// =============================================================================
// Module Declarations
// =============================================================================

pub mod capability;
pub mod config;
pub mod controller;
pub mod error;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use capability::{
    BarcodeScanner, CameraAccess, CapabilityError, DetectionSink, NfcWriter, WriteCompletion,
};
pub use config::{InventorySettings, SessionSettings, StorageSettings, TagwriterConfig, TierSettings};
pub use controller::{Capabilities, SessionController, SessionHandle};
pub use error::{SessionError, SessionResult};
pub use store::TagStore;

/// Opens the SQLite database named by `config` and loads the inventory.
///
/// Migrations run on open. The returned store keeps the database alive
/// through its snapshot store.
pub async fn open_inventory(config: &TagwriterConfig) -> SessionResult<TagStore> {
    let path = config.database_path().ok_or_else(|| {
        SessionError::InvalidConfig("no database path and no platform data directory".into())
    })?;
    info!(?path, "Opening tag database");

    let db = Database::new(DbConfig::new(path)).await?;
    TagStore::open(Arc::new(db.snapshots()), config).await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tagwriter_session=trace` - Trace the session crate only
/// - Default: INFO, with debug for tagwriter crates
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,tagwriter_core=debug,tagwriter_db=debug,tagwriter_session=debug,sqlx=warn")
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_inventory_on_file() {
        let path = std::env::temp_dir().join(format!("tagwriter-{}.db", uuid::Uuid::new_v4()));
        let mut config = TagwriterConfig::default();
        config.storage.database_path = Some(path.clone());

        let store = open_inventory(&config).await.unwrap();
        let record = store
            .add_tag(tagwriter_core::NewTag::new(
                "Menu",
                "https://example.com/menu",
                tagwriter_core::TagType::Ntag213,
            ))
            .await
            .unwrap();
        store.flush().await.unwrap();
        drop(store);

        let reopened = open_inventory(&config).await.unwrap();
        assert_eq!(reopened.get(&record.id).await.unwrap().name, "Menu");
        assert_eq!(reopened.tier().await.tag_count, 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
