//! Service layer for board reads and ordered mutations.

use super::BoardConfig;
use crate::board::{
    domain::{
        Board, BoardDomainError, Column, ColumnDraft, ColumnId, ColumnTitle, MoveTask, Task,
        TaskContent, TaskDraft, TaskId, target_index,
    },
    ports::{BoardStore, BoardStoreError, BoardStoreResult},
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Coarse error classification for callers that only need the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardErrorKind {
    /// Malformed input.
    Validation,
    /// A referenced column or task does not exist.
    NotFound,
    /// A concurrent mutation of the same scope won.
    Conflict,
    /// The persistence layer rejected a referential constraint.
    Constraint,
    /// Any other failure.
    Internal,
}

/// Service-level errors for board operations.
#[derive(Debug, Clone, Error)]
pub enum BoardServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] BoardDomainError),

    /// The referenced column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The mutation could not be serialized against a concurrent one.
    #[error("conflicting concurrent mutation: {0}")]
    Conflict(String),

    /// The persistence layer rejected a referential constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardServiceError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> BoardErrorKind {
        match self {
            Self::Validation(_) => BoardErrorKind::Validation,
            Self::ColumnNotFound(_) | Self::TaskNotFound(_) => BoardErrorKind::NotFound,
            Self::Conflict(_) => BoardErrorKind::Conflict,
            Self::Constraint(_) => BoardErrorKind::Constraint,
            Self::Persistence(_) => BoardErrorKind::Internal,
        }
    }
}

impl From<BoardStoreError> for BoardServiceError {
    fn from(err: BoardStoreError) -> Self {
        match err {
            BoardStoreError::ColumnNotFound(id) => Self::ColumnNotFound(id),
            BoardStoreError::TaskNotFound(id) => Self::TaskNotFound(id),
            BoardStoreError::Conflict(reason) => Self::Conflict(reason),
            BoardStoreError::Constraint(reason) => Self::Constraint(reason),
            BoardStoreError::Persistence(source) => Self::Persistence(source),
            other @ BoardStoreError::InvalidOrder(_) => Self::Persistence(Arc::new(other)),
        }
    }
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;

/// Board orchestration service.
///
/// Validates caller input, delegates each operation to one store call and
/// retries a conflicting mutation once when
/// [`BoardConfig::retry_on_conflict`] is set. The store re-reads its scope
/// on every call, so the retry always works from fresh state.
#[derive(Clone)]
pub struct BoardService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: BoardConfig,
}

impl<S, C> BoardService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a new board service with default settings.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(store, clock, BoardConfig::default())
    }

    /// Creates a new board service with explicit settings.
    #[must_use]
    pub const fn with_config(store: Arc<S>, clock: Arc<C>, config: BoardConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Returns the board with columns and tasks in order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Persistence`] when the snapshot cannot be
    /// read.
    pub async fn get_board(&self) -> BoardServiceResult<Board> {
        let snapshot = self
            .retrying("get_board", || self.store.load_snapshot())
            .await?;
        let orphaned = snapshot.orphaned_tasks();
        if !orphaned.is_empty() {
            warn!(count = orphaned.len(), "snapshot holds tasks without a column");
        }
        Ok(snapshot.into_board())
    }

    /// Finds a column by identifier, without its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Persistence`] when the lookup fails.
    pub async fn find_column(&self, id: ColumnId) -> BoardServiceResult<Option<Column>> {
        Ok(self.store.find_column(id).await?)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Persistence`] when the lookup fails.
    pub async fn find_task(&self, id: TaskId) -> BoardServiceResult<Option<Task>> {
        Ok(self.store.find_task(id).await?)
    }

    /// Appends a new column at the end of the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for an empty or oversized
    /// title.
    pub async fn create_column(&self, title: &str) -> BoardServiceResult<Column> {
        let draft = ColumnDraft::new(ColumnTitle::with_limit(
            title,
            self.config.max_title_length,
        )?);
        self.retrying("create_column", || self.store.create_column(draft.clone()))
            .await
    }

    /// Deletes a column together with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ColumnNotFound`] when the column does not
    /// exist.
    pub async fn delete_column(&self, id: ColumnId) -> BoardServiceResult<()> {
        self.retrying("delete_column", || self.store.delete_column(id))
            .await?;
        Ok(())
    }

    /// Appends a new task at the end of `column_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for empty or oversized
    /// content and [`BoardServiceError::ColumnNotFound`] when the column does
    /// not exist.
    pub async fn create_task(&self, column_id: ColumnId, content: &str) -> BoardServiceResult<Task> {
        let validated = TaskContent::with_limit(content, self.config.max_content_length)?;
        let draft = TaskDraft::new(validated, &*self.clock);
        self.retrying("create_task", || {
            self.store.create_task(column_id, draft.clone())
        })
        .await
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] when the task does not
    /// exist.
    pub async fn delete_task(&self, id: TaskId) -> BoardServiceResult<()> {
        self.retrying("delete_task", || self.store.delete_task(id))
            .await?;
        Ok(())
    }

    /// Moves a task to `target_index` of `target_column_id`.
    ///
    /// Indexes past the end of the target column place the task last.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for a negative index,
    /// [`BoardServiceError::TaskNotFound`] or
    /// [`BoardServiceError::ColumnNotFound`] for unknown identifiers, and
    /// [`BoardServiceError::Conflict`] when a concurrent mutation won.
    pub async fn move_task(
        &self,
        task_id: TaskId,
        target_column_id: ColumnId,
        index: i64,
    ) -> BoardServiceResult<()> {
        let request = MoveTask::new(task_id, target_column_id, target_index(index)?);
        self.retrying("move_task", || self.store.move_task(request))
            .await?;
        Ok(())
    }

    /// Moves a column to `target_index` on the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for a negative index,
    /// [`BoardServiceError::ColumnNotFound`] for an unknown column, and
    /// [`BoardServiceError::Conflict`] when a concurrent mutation won.
    pub async fn reorder_column(&self, column_id: ColumnId, index: i64) -> BoardServiceResult<()> {
        let position = target_index(index)?;
        self.retrying("reorder_column", || {
            self.store.reorder_column(column_id, position)
        })
        .await?;
        Ok(())
    }

    async fn retrying<T, F, Fut>(&self, operation: &'static str, mut call: F) -> BoardServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BoardStoreResult<T>>,
    {
        match call().await {
            Err(err) if err.is_conflict() && self.config.retry_on_conflict => {
                warn!(operation, error = %err, "conflict, retrying once");
                call().await.map_err(|retry_err| {
                    if retry_err.is_conflict() {
                        warn!(operation, error = %retry_err, "conflict persisted after retry");
                    }
                    BoardServiceError::from(retry_err)
                })
            }
            result => Ok(result?),
        }
    }
}
