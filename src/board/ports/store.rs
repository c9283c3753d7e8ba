//! Store port for transactional board mutations.

use crate::board::domain::{
    BoardSnapshot, Column, ColumnDraft, ColumnId, MoveTask, OrderingError, Renumbering, Task,
    TaskDraft, TaskId,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for board store operations.
pub type BoardStoreResult<T> = Result<T, BoardStoreError>;

/// Transactional board persistence contract.
///
/// Every mutation is one atomic unit: it reads the rows of the scopes it
/// touches, renumbers them with [`crate::board::domain::ordering`], writes
/// every row whose order or column changed and commits. Mutations that
/// touch overlapping scopes are serialized, so no commit is ever based on a
/// stale read, and a failed mutation leaves no visible writes.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Reads all columns and tasks from one consistent snapshot.
    async fn load_snapshot(&self) -> BoardStoreResult<BoardSnapshot>;

    /// Finds a column by identifier, without its tasks.
    async fn find_column(&self, id: ColumnId) -> BoardStoreResult<Option<Column>>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> BoardStoreResult<Option<Task>>;

    /// Appends a column at the end of the board.
    async fn create_column(&self, draft: ColumnDraft) -> BoardStoreResult<Column>;

    /// Deletes a column and its tasks, closing the gap in column order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::ColumnNotFound`] when the column does not
    /// exist.
    async fn delete_column(&self, id: ColumnId) -> BoardStoreResult<Renumbering>;

    /// Appends a task at the end of `column_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::ColumnNotFound`] when the column does not
    /// exist.
    async fn create_task(&self, column_id: ColumnId, draft: TaskDraft) -> BoardStoreResult<Task>;

    /// Deletes a task, closing the gap in its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::TaskNotFound`] when the task does not
    /// exist.
    async fn delete_task(&self, id: TaskId) -> BoardStoreResult<Renumbering>;

    /// Moves a task within or across columns, renumbering both scopes.
    ///
    /// Re-applying a move that already took effect rewrites nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::TaskNotFound`] or
    /// [`BoardStoreError::ColumnNotFound`] for unknown identifiers and
    /// [`BoardStoreError::Conflict`] when the move could not be serialized
    /// against a concurrent mutation.
    async fn move_task(&self, request: MoveTask) -> BoardStoreResult<Renumbering>;

    /// Moves a column to `target_index`, renumbering the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::ColumnNotFound`] when the column does not
    /// exist and [`BoardStoreError::Conflict`] on serialization failure.
    async fn reorder_column(
        &self,
        id: ColumnId,
        target_index: usize,
    ) -> BoardStoreResult<Renumbering>;
}

/// Errors returned by board store implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardStoreError {
    /// The column was not found.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The mutation could not be serialized against a concurrent one.
    #[error("conflicting concurrent mutation: {0}")]
    Conflict(String),

    /// The persistence layer rejected a referential constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored order index does not fit the domain range.
    #[error("stored order index {0} is out of range")]
    InvalidOrder(i64),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Creates a conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    /// Maps an ordering failure, substituting `missing` for a lookup miss.
    #[must_use]
    pub fn from_ordering(err: OrderingError, missing: Self) -> Self {
        match err {
            OrderingError::NotFound => missing,
            OrderingError::CapacityExceeded => Self::Constraint(err.to_string()),
        }
    }

    /// Returns `true` when retrying against a fresh snapshot may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Shortest lock wait a store will configure, in milliseconds.
///
/// `PostgreSQL` reads a `lock_timeout` of zero as "wait forever".
pub const MIN_LOCK_TIMEOUT_MS: u64 = 1;

/// Adapter settings shared by board store implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on waiting for a lock held by a concurrent mutation, in
    /// milliseconds. A mutation that waits longer fails with
    /// [`BoardStoreError::Conflict`].
    ///
    /// Zero is raised to one millisecond: every wait is bounded. Adapters
    /// read the effective value through [`StoreConfig::lock_timeout_millis`].
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with the given lock timeout.
    #[must_use]
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            lock_timeout_ms: u64::try_from(lock_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Returns the effective lock timeout in milliseconds, never zero.
    #[must_use]
    pub const fn lock_timeout_millis(&self) -> u64 {
        if self.lock_timeout_ms < MIN_LOCK_TIMEOUT_MS {
            MIN_LOCK_TIMEOUT_MS
        } else {
            self.lock_timeout_ms
        }
    }

    /// Returns the effective lock timeout as a [`Duration`].
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_millis())
    }
}
