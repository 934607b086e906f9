//! # Repositories
//!
//! Thin SQL wrappers, one per table.
//!
//! - [`storage`] - `app_storage` key/value blobs

pub mod storage;
