//! Port contracts for board persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod store;

pub use store::{BoardStore, BoardStoreError, BoardStoreResult, StoreConfig, MIN_LOCK_TIMEOUT_MS};
