//! In-memory adapter for board persistence.

mod store;

pub use store::InMemoryBoardStore;
