//! # tagwriter-db: Persistence Layer for Tagwriter
//!
//! Saves and restores the tag inventory. SQLite in production, an in-memory
//! map in tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tagwriter Data Flow                              │
//! │                                                                         │
//! │  TagStore mutation (add_tag, delete_tag, ...)                           │
//! │       │  queued, fire-and-forget                                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tagwriter-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ SnapshotStore  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  SQLite / mem  │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  app_storage(key, value, updated_at)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Key/value table access
//! - [`snapshot`] - Inventory save/load over any backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagwriter_db::{Database, DbConfig, SnapshotStore};
//!
//! let db = Database::new(DbConfig::new("tagwriter.db")).await?;
//! let store = db.snapshots();
//! let inventory = store.load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::storage::StorageRepository;
pub use snapshot::{MemorySnapshotStore, SnapshotStore, SqliteSnapshotStore};
