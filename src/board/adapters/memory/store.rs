//! Lock-serialized in-memory board store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::board::{
    domain::{
        BoardSnapshot, Column, ColumnDraft, ColumnId, ColumnTitle, MoveTask, OrderIndex,
        PersistedColumnData, PersistedTaskData, Renumbering, Task, TaskContent, TaskDraft, TaskId,
        ordering,
    },
    ports::{BoardStore, BoardStoreError, BoardStoreResult, StoreConfig},
};

/// Thread-safe in-memory board store.
///
/// Every mutation holds the board-wide write lock for its whole
/// read-compute-write cycle and works on a copy of the state, which replaces
/// the shared state only once the mutation has fully succeeded. Readers see
/// either the state before a mutation or after it. Waiting for the lock is
/// bounded by [`StoreConfig::lock_timeout_ms`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardStore {
    state: Arc<RwLock<BoardState>>,
    config: StoreConfig,
}

#[derive(Debug, Clone, Default)]
struct BoardState {
    columns: HashMap<ColumnId, ColumnRecord>,
    tasks: HashMap<TaskId, TaskRecord>,
}

#[derive(Debug, Clone)]
struct ColumnRecord {
    title: ColumnTitle,
    order: OrderIndex,
}

#[derive(Debug, Clone)]
struct TaskRecord {
    content: TaskContent,
    column_id: ColumnId,
    order: OrderIndex,
    created_at: DateTime<Utc>,
}

impl InMemoryBoardStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty in-memory store with explicit adapter settings.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: Arc::default(),
            config,
        }
    }

    async fn read_guard(&self) -> BoardStoreResult<RwLockReadGuard<'_, BoardState>> {
        tokio::time::timeout(self.config.lock_timeout(), self.state.read())
            .await
            .map_err(|_| self.lock_timeout_error("read"))
    }

    async fn write_guard(
        &self,
        operation: &'static str,
    ) -> BoardStoreResult<RwLockWriteGuard<'_, BoardState>> {
        tokio::time::timeout(self.config.lock_timeout(), self.state.write())
            .await
            .map_err(|_| self.lock_timeout_error(operation))
    }

    fn lock_timeout_error(&self, operation: &str) -> BoardStoreError {
        debug!(
            operation,
            lock_timeout_ms = self.config.lock_timeout_millis(),
            "board lock wait timed out"
        );
        BoardStoreError::conflict(format!(
            "{operation} timed out after {} ms waiting for the board lock",
            self.config.lock_timeout_millis()
        ))
    }

    /// Runs `mutation` against a copy of the state and publishes the copy
    /// only if the mutation succeeds.
    async fn mutate<T, F>(&self, operation: &'static str, mutation: F) -> BoardStoreResult<T>
    where
        F: FnOnce(&mut BoardState) -> BoardStoreResult<T> + Send,
        T: Send,
    {
        let mut guard = self.write_guard(operation).await?;
        let mut working = guard.clone();
        let outcome = mutation(&mut working)?;
        debug_assert!(working.is_consistent(), "{operation} broke board ordering");
        *guard = working;
        Ok(outcome)
    }
}

impl BoardState {
    fn column_orders(&self) -> Vec<(ColumnId, OrderIndex)> {
        let mut orders: Vec<(ColumnId, OrderIndex)> = self
            .columns
            .iter()
            .map(|(id, record)| (*id, record.order))
            .collect();
        orders.sort_by_key(|(id, order)| (*order, *id));
        orders
    }

    fn task_orders_in(&self, column_id: ColumnId) -> Vec<(TaskId, OrderIndex)> {
        let mut orders: Vec<(TaskId, OrderIndex)> = self
            .tasks
            .iter()
            .filter(|(_, record)| record.column_id == column_id)
            .map(|(id, record)| (*id, record.order))
            .collect();
        orders.sort_by_key(|(id, order)| (*order, *id));
        orders
    }

    fn next_column_order(&self) -> BoardStoreResult<OrderIndex> {
        next_order(self.columns.len())
    }

    fn next_task_order(&self, column_id: ColumnId) -> BoardStoreResult<OrderIndex> {
        let count = self
            .tasks
            .values()
            .filter(|record| record.column_id == column_id)
            .count();
        next_order(count)
    }

    fn apply_column_orders(&mut self, changes: &[(ColumnId, OrderIndex)]) -> usize {
        let mut updated = 0;
        for (id, order) in changes {
            if let Some(record) = self.columns.get_mut(id) {
                record.order = *order;
                updated += 1;
            }
        }
        updated
    }

    fn apply_task_orders(&mut self, column_id: ColumnId, changes: &[(TaskId, OrderIndex)]) -> usize {
        let mut updated = 0;
        for (id, order) in changes {
            if let Some(record) = self.tasks.get_mut(id) {
                record.column_id = column_id;
                record.order = *order;
                updated += 1;
            }
        }
        updated
    }

    fn renumber_columns(&mut self, renumbered: &[ColumnId]) -> BoardStoreResult<usize> {
        let stored = self.column_orders();
        let changes = ordering::changed_orders(&stored, renumbered)
            .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
        Ok(self.apply_column_orders(&changes))
    }

    fn renumber_tasks(&mut self, column_id: ColumnId, renumbered: &[TaskId]) -> BoardStoreResult<usize> {
        let stored = self.task_orders_in(column_id);
        let changes = ordering::changed_orders(&stored, renumbered)
            .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
        Ok(self.apply_task_orders(column_id, &changes))
    }

    fn column(&self, id: ColumnId) -> Option<Column> {
        self.columns.get(&id).map(|record| {
            Column::from_persisted(PersistedColumnData {
                id,
                title: record.title.clone(),
                order: record.order,
            })
        })
    }

    fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).map(|record| {
            Task::from_persisted(PersistedTaskData {
                id,
                content: record.content.clone(),
                column_id: record.column_id,
                order: record.order,
                created_at: record.created_at,
            })
        })
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            columns: self.columns.keys().filter_map(|id| self.column(*id)).collect(),
            tasks: self.tasks.keys().filter_map(|id| self.task(*id)).collect(),
        }
    }

    fn is_consistent(&self) -> bool {
        let columns_dense =
            ordering::is_contiguous(self.columns.values().map(|record| record.order));
        let tasks_dense = self.columns.keys().all(|column_id| {
            ordering::is_contiguous(self.task_orders_in(*column_id).into_iter().map(|(_, o)| o))
        });
        let tasks_owned = self
            .tasks
            .values()
            .all(|record| self.columns.contains_key(&record.column_id));
        columns_dense && tasks_dense && tasks_owned
    }
}

fn next_order(count: usize) -> BoardStoreResult<OrderIndex> {
    OrderIndex::from_position(count)
        .ok_or_else(|| BoardStoreError::Constraint(format!("scope of {count} items is full")))
}

fn ids<T: Copy>(orders: &[(T, OrderIndex)]) -> Vec<T> {
    orders.iter().map(|(id, _)| *id).collect()
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn load_snapshot(&self) -> BoardStoreResult<BoardSnapshot> {
        let state = self.read_guard().await?;
        Ok(state.snapshot())
    }

    async fn find_column(&self, id: ColumnId) -> BoardStoreResult<Option<Column>> {
        let state = self.read_guard().await?;
        Ok(state.column(id))
    }

    async fn find_task(&self, id: TaskId) -> BoardStoreResult<Option<Task>> {
        let state = self.read_guard().await?;
        Ok(state.task(id))
    }

    async fn create_column(&self, draft: ColumnDraft) -> BoardStoreResult<Column> {
        let column = self
            .mutate("create_column", move |state| {
                let order = state.next_column_order()?;
                let column = Column::from_draft(draft, order);
                if state.columns.contains_key(&column.id()) {
                    return Err(BoardStoreError::Constraint(format!(
                        "duplicate column identifier: {}",
                        column.id()
                    )));
                }
                state.columns.insert(
                    column.id(),
                    ColumnRecord {
                        title: column.title().clone(),
                        order,
                    },
                );
                Ok(column)
            })
            .await?;
        debug!(column_id = %column.id(), order = %column.order(), "column created");
        Ok(column)
    }

    async fn delete_column(&self, id: ColumnId) -> BoardStoreResult<Renumbering> {
        let renumbering = self
            .mutate("delete_column", move |state| {
                let stored = state.column_orders();
                let remaining = ordering::remove_at(&ids(&stored), id).map_err(|err| {
                    BoardStoreError::from_ordering(err, BoardStoreError::ColumnNotFound(id))
                })?;
                state.columns.remove(&id);
                state.tasks.retain(|_, record| record.column_id != id);
                state.renumber_columns(&remaining).map(Renumbering::new)
            })
            .await?;
        debug!(
            column_id = %id,
            rows_updated = renumbering.rows_updated(),
            "column deleted"
        );
        Ok(renumbering)
    }

    async fn create_task(&self, column_id: ColumnId, draft: TaskDraft) -> BoardStoreResult<Task> {
        let task = self
            .mutate("create_task", move |state| {
                if !state.columns.contains_key(&column_id) {
                    return Err(BoardStoreError::ColumnNotFound(column_id));
                }
                let order = state.next_task_order(column_id)?;
                let task = Task::from_draft(draft, column_id, order);
                if state.tasks.contains_key(&task.id()) {
                    return Err(BoardStoreError::Constraint(format!(
                        "duplicate task identifier: {}",
                        task.id()
                    )));
                }
                state.tasks.insert(
                    task.id(),
                    TaskRecord {
                        content: task.content().clone(),
                        column_id,
                        order,
                        created_at: task.created_at(),
                    },
                );
                Ok(task)
            })
            .await?;
        debug!(task_id = %task.id(), column_id = %column_id, order = %task.order(), "task created");
        Ok(task)
    }

    async fn delete_task(&self, id: TaskId) -> BoardStoreResult<Renumbering> {
        let renumbering = self
            .mutate("delete_task", move |state| {
                let record = state
                    .tasks
                    .remove(&id)
                    .ok_or(BoardStoreError::TaskNotFound(id))?;
                let remaining = ids(&state.task_orders_in(record.column_id));
                state
                    .renumber_tasks(record.column_id, &remaining)
                    .map(Renumbering::new)
            })
            .await?;
        debug!(task_id = %id, rows_updated = renumbering.rows_updated(), "task deleted");
        Ok(renumbering)
    }

    async fn move_task(&self, request: MoveTask) -> BoardStoreResult<Renumbering> {
        let MoveTask {
            task_id,
            target_column_id,
            target_index,
        } = request;
        let renumbering = self
            .mutate("move_task", move |state| {
                let source_column_id = state
                    .tasks
                    .get(&task_id)
                    .map(|record| record.column_id)
                    .ok_or(BoardStoreError::TaskNotFound(task_id))?;
                if !state.columns.contains_key(&target_column_id) {
                    return Err(BoardStoreError::ColumnNotFound(target_column_id));
                }
                let missing = || BoardStoreError::TaskNotFound(task_id);

                let source = ids(&state.task_orders_in(source_column_id));
                if source_column_id == target_column_id {
                    let renumbered = ordering::move_within(&source, task_id, target_index)
                        .map_err(|err| BoardStoreError::from_ordering(err, missing()))?;
                    return state
                        .renumber_tasks(source_column_id, &renumbered)
                        .map(Renumbering::new);
                }

                let target = ids(&state.task_orders_in(target_column_id));
                let (source_after, target_after) =
                    ordering::move_across(&source, &target, task_id, target_index)
                        .map_err(|err| BoardStoreError::from_ordering(err, missing()))?;
                // The moved task still belongs to the source scope until the
                // target renumbering reassigns it, so rewrite the target first.
                let target_rows = state.renumber_tasks(target_column_id, &target_after)?;
                let source_rows = state.renumber_tasks(source_column_id, &source_after)?;
                Ok(Renumbering::new(target_rows + source_rows))
            })
            .await?;
        debug!(
            task_id = %task_id,
            target_column_id = %target_column_id,
            target_index,
            rows_updated = renumbering.rows_updated(),
            "task moved"
        );
        Ok(renumbering)
    }

    async fn reorder_column(
        &self,
        id: ColumnId,
        target_index: usize,
    ) -> BoardStoreResult<Renumbering> {
        let renumbering = self
            .mutate("reorder_column", move |state| {
                let stored = state.column_orders();
                let renumbered = ordering::move_within(&ids(&stored), id, target_index)
                    .map_err(|err| {
                        BoardStoreError::from_ordering(err, BoardStoreError::ColumnNotFound(id))
                    })?;
                state.renumber_columns(&renumbered).map(Renumbering::new)
            })
            .await?;
        debug!(
            column_id = %id,
            target_index,
            rows_updated = renumbering.rows_updated(),
            "column reordered"
        );
        Ok(renumbering)
    }
}
