//! `PostgreSQL` store implementation for board ordering.

use super::{
    models::{
        ColumnRow, NewColumnRow, NewTaskRow, TaskRow, order_from_stored, order_to_stored,
        row_to_column, row_to_task,
    },
    schema::{board_columns, board_tasks},
};
use crate::board::{
    domain::{
        BoardSnapshot, Column, ColumnDraft, ColumnId, MoveTask, OrderIndex, Renumbering, Task,
        TaskDraft, TaskId, ordering,
    },
    ports::{BoardStore, BoardStoreError, BoardStoreResult, StoreConfig},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::debug;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// Advisory lock key serializing mutations of the board's column list.
const COLUMN_SCOPE_LOCK_KEY: i64 = 0x636f_726b_626f_6172;

/// `PostgreSQL`-backed board store.
///
/// Every mutation is one `READ COMMITTED` transaction that locks its scope
/// before reading it: the column list through a transaction-level advisory
/// lock, a column's task list through a row lock on the column. Each
/// statement after a lock sees what the previous holder committed, so
/// writers queued on one column run one after another on fresh rows.
///
/// Column rows are always locked in identifier order. Waits are bounded by
/// `lock_timeout`, and a lock timeout, deadlock or deferred order-uniqueness
/// failure is reported as [`BoardStoreError::Conflict`].
#[derive(Debug, Clone)]
pub struct PostgresBoardStore {
    pool: BoardPgPool,
    config: StoreConfig,
}

impl PostgresBoardStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: BoardPgPool) -> Self {
        Self::with_config(pool, StoreConfig::default())
    }

    /// Creates a new store with explicit adapter settings.
    #[must_use]
    pub const fn with_config(pool: BoardPgPool, config: StoreConfig) -> Self {
        Self { pool, config }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &BoardPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardStoreError::persistence)?
    }

    /// Runs `f` inside a read-only snapshot.
    async fn read<F, T>(&self, f: F) -> BoardStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection
                .build_transaction()
                .repeatable_read()
                .read_only()
                .run(f)
        })
        .await
    }

    /// Runs `f` inside a read-committed transaction with a bounded lock wait.
    async fn write<F, T>(&self, f: F) -> BoardStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let lock_timeout = format!("{}ms", self.config.lock_timeout_millis());
        self.run_blocking(move |connection| {
            connection
                .build_transaction()
                .read_committed()
                .read_write()
                .run(|tx| {
                    diesel::sql_query("SELECT set_config('lock_timeout', $1, true)")
                        .bind::<diesel::sql_types::Text, _>(lock_timeout.as_str())
                        .execute(tx)?;
                    f(tx)
                })
        })
        .await
    }
}

#[async_trait]
impl BoardStore for PostgresBoardStore {
    async fn load_snapshot(&self) -> BoardStoreResult<BoardSnapshot> {
        self.read(|connection| {
            let columns = board_columns::table
                .select(ColumnRow::as_select())
                .load::<ColumnRow>(connection)?
                .into_iter()
                .map(row_to_column)
                .collect::<BoardStoreResult<Vec<_>>>()?;
            let tasks = board_tasks::table
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect::<BoardStoreResult<Vec<_>>>()?;
            Ok(BoardSnapshot { columns, tasks })
        })
        .await
    }

    async fn find_column(&self, id: ColumnId) -> BoardStoreResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let row = board_columns::table
                .find(id.into_inner())
                .select(ColumnRow::as_select())
                .first::<ColumnRow>(connection)
                .optional()?;
            row.map(row_to_column).transpose()
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> BoardStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = board_tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn create_column(&self, draft: ColumnDraft) -> BoardStoreResult<Column> {
        let column = self
            .write(move |tx| {
                lock_column_scope(tx)?;
                let count = board_columns::table.count().get_result::<i64>(tx)?;
                let column = Column::from_draft(draft, next_order(count)?);
                diesel::insert_into(board_columns::table)
                    .values(&NewColumnRow::from_domain(&column)?)
                    .execute(tx)?;
                Ok(column)
            })
            .await?;
        debug!(column_id = %column.id(), order = %column.order(), "column created");
        Ok(column)
    }

    async fn delete_column(&self, id: ColumnId) -> BoardStoreResult<Renumbering> {
        let renumbering = self
            .write(move |tx| {
                lock_column_scope(tx)?;
                lock_all_columns(tx)?;
                let stored = load_column_orders(tx)?;
                let remaining = ordering::remove_at(&ids(&stored), id).map_err(|err| {
                    BoardStoreError::from_ordering(err, BoardStoreError::ColumnNotFound(id))
                })?;
                diesel::delete(board_columns::table.find(id.into_inner())).execute(tx)?;
                let changes = ordering::changed_orders(&stored, &remaining)
                    .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
                write_column_orders(tx, &changes).map(Renumbering::new)
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
            .write(move |tx| {
                let locked = lock_columns(tx, &[column_id])?;
                if !locked.contains(&column_id) {
                    return Err(BoardStoreError::ColumnNotFound(column_id));
                }
                let count = board_tasks::table
                    .filter(board_tasks::column_id.eq(column_id.into_inner()))
                    .count()
                    .get_result::<i64>(tx)?;
                let task = Task::from_draft(draft, column_id, next_order(count)?);
                diesel::insert_into(board_tasks::table)
                    .values(&NewTaskRow::from_domain(&task)?)
                    .execute(tx)?;
                Ok(task)
            })
            .await?;
        debug!(task_id = %task.id(), column_id = %column_id, order = %task.order(), "task created");
        Ok(task)
    }

    async fn delete_task(&self, id: TaskId) -> BoardStoreResult<Renumbering> {
        let renumbering = self
            .write(move |tx| {
                let column_id = find_task_column(tx, id)?;
                lock_columns(tx, &[column_id])?;
                ensure_task_in(tx, id, column_id)?;
                diesel::delete(board_tasks::table.find(id.into_inner())).execute(tx)?;
                let stored = load_task_orders(tx, column_id)?;
                let changes = ordering::changed_orders(&stored, &ids(&stored))
                    .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
                write_task_orders(tx, column_id, &changes).map(Renumbering::new)
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
            .write(move |tx| {
                let source_column_id = find_task_column(tx, task_id)?;
                let locked = lock_columns(tx, &[source_column_id, target_column_id])?;
                ensure_task_in(tx, task_id, source_column_id)?;
                if !locked.contains(&target_column_id) {
                    return Err(BoardStoreError::ColumnNotFound(target_column_id));
                }
                let missing = || BoardStoreError::TaskNotFound(task_id);

                let source_stored = load_task_orders(tx, source_column_id)?;
                if source_column_id == target_column_id {
                    let renumbered =
                        ordering::move_within(&ids(&source_stored), task_id, target_index)
                            .map_err(|err| BoardStoreError::from_ordering(err, missing()))?;
                    let changes = ordering::changed_orders(&source_stored, &renumbered)
                        .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
                    return write_task_orders(tx, source_column_id, &changes).map(Renumbering::new);
                }

                let target_stored = load_task_orders(tx, target_column_id)?;
                let (source_after, target_after) = ordering::move_across(
                    &ids(&source_stored),
                    &ids(&target_stored),
                    task_id,
                    target_index,
                )
                .map_err(|err| BoardStoreError::from_ordering(err, missing()))?;
                let source_changes = ordering::changed_orders(&source_stored, &source_after)
                    .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
                let target_changes = ordering::changed_orders(&target_stored, &target_after)
                    .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
                let source_rows = write_task_orders(tx, source_column_id, &source_changes)?;
                let target_rows = write_task_orders(tx, target_column_id, &target_changes)?;
                Ok(Renumbering::new(source_rows + target_rows))
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
            .write(move |tx| {
                lock_column_scope(tx)?;
                lock_all_columns(tx)?;
                let stored = load_column_orders(tx)?;
                let renumbered = ordering::move_within(&ids(&stored), id, target_index)
                    .map_err(|err| {
                        BoardStoreError::from_ordering(err, BoardStoreError::ColumnNotFound(id))
                    })?;
                let changes = ordering::changed_orders(&stored, &renumbered)
                    .map_err(|err| BoardStoreError::Constraint(err.to_string()))?;
                write_column_orders(tx, &changes).map(Renumbering::new)
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

/// Serializes column-list mutations for the rest of the transaction.
fn lock_column_scope(tx: &mut PgConnection) -> BoardStoreResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
        .bind::<diesel::sql_types::BigInt, _>(COLUMN_SCOPE_LOCK_KEY)
        .execute(tx)?;
    Ok(())
}

/// Row-locks the given columns in identifier order and returns those that
/// exist.
fn lock_columns(tx: &mut PgConnection, ids: &[ColumnId]) -> BoardStoreResult<Vec<ColumnId>> {
    let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
    let locked = board_columns::table
        .filter(board_columns::id.eq_any(uuids))
        .order(board_columns::id.asc())
        .select(board_columns::id)
        .for_update()
        .load::<Uuid>(tx)?;
    Ok(locked.into_iter().map(ColumnId::from_uuid).collect())
}

/// Row-locks every column in identifier order.
fn lock_all_columns(tx: &mut PgConnection) -> BoardStoreResult<()> {
    board_columns::table
        .order(board_columns::id.asc())
        .select(board_columns::id)
        .for_update()
        .load::<Uuid>(tx)?;
    Ok(())
}

/// Re-reads the task's column once its scope is locked.
///
/// The first lookup runs before any lock, so a concurrent move may have
/// carried the task elsewhere in the meantime.
fn ensure_task_in(tx: &mut PgConnection, id: TaskId, expected: ColumnId) -> BoardStoreResult<()> {
    let current = find_task_column(tx, id)?;
    if current == expected {
        Ok(())
    } else {
        debug!(
            task_id = %id,
            from = %expected,
            to = %current,
            "task moved while waiting for its column"
        );
        Err(BoardStoreError::conflict(format!(
            "task {id} moved to another column concurrently"
        )))
    }
}

fn find_task_column(tx: &mut PgConnection, id: TaskId) -> BoardStoreResult<ColumnId> {
    board_tasks::table
        .find(id.into_inner())
        .select(board_tasks::column_id)
        .first::<Uuid>(tx)
        .optional()?
        .map(ColumnId::from_uuid)
        .ok_or(BoardStoreError::TaskNotFound(id))
}

fn load_column_orders(tx: &mut PgConnection) -> BoardStoreResult<Vec<(ColumnId, OrderIndex)>> {
    board_columns::table
        .order((board_columns::order_index.asc(), board_columns::id.asc()))
        .select((board_columns::id, board_columns::order_index))
        .load::<(Uuid, i32)>(tx)?
        .into_iter()
        .map(|(id, order)| Ok((ColumnId::from_uuid(id), order_from_stored(order)?)))
        .collect()
}

fn load_task_orders(
    tx: &mut PgConnection,
    column_id: ColumnId,
) -> BoardStoreResult<Vec<(TaskId, OrderIndex)>> {
    board_tasks::table
        .filter(board_tasks::column_id.eq(column_id.into_inner()))
        .order((board_tasks::order_index.asc(), board_tasks::id.asc()))
        .select((board_tasks::id, board_tasks::order_index))
        .load::<(Uuid, i32)>(tx)?
        .into_iter()
        .map(|(id, order)| Ok((TaskId::from_uuid(id), order_from_stored(order)?)))
        .collect()
}

fn write_column_orders(
    tx: &mut PgConnection,
    changes: &[(ColumnId, OrderIndex)],
) -> BoardStoreResult<usize> {
    let mut updated = 0;
    for (id, order) in changes {
        updated += diesel::update(board_columns::table.find(id.into_inner()))
            .set(board_columns::order_index.eq(order_to_stored(*order)?))
            .execute(tx)?;
    }
    Ok(updated)
}

/// Writes each changed task's order and places it in `column_id`.
fn write_task_orders(
    tx: &mut PgConnection,
    column_id: ColumnId,
    changes: &[(TaskId, OrderIndex)],
) -> BoardStoreResult<usize> {
    let mut updated = 0;
    for (id, order) in changes {
        updated += diesel::update(board_tasks::table.find(id.into_inner()))
            .set((
                board_tasks::column_id.eq(column_id.into_inner()),
                board_tasks::order_index.eq(order_to_stored(*order)?),
            ))
            .execute(tx)?;
    }
    Ok(updated)
}

fn next_order(count: i64) -> BoardStoreResult<OrderIndex> {
    u32::try_from(count)
        .map(OrderIndex::new)
        .map_err(|_| BoardStoreError::Constraint(format!("scope of {count} items is full")))
}

fn ids<T: Copy>(orders: &[(T, OrderIndex)]) -> Vec<T> {
    orders.iter().map(|(id, _)| *id).collect()
}
