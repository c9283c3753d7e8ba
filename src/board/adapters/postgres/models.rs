//! Diesel row models for board persistence.

use super::schema::{board_columns, board_tasks};
use crate::board::{
    domain::{
        Column, ColumnId, ColumnTitle, OrderIndex, PersistedColumnData, PersistedTaskData, Task,
        TaskContent, TaskId,
    },
    ports::{BoardStoreError, BoardStoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for column records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Column title.
    pub title: String,
    /// Position on the board.
    pub order_index: i32,
}

/// Insert model for column records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = board_columns)]
pub struct NewColumnRow {
    /// Column identifier.
    pub id: uuid::Uuid,
    /// Column title.
    pub title: String,
    /// Position on the board.
    pub order_index: i32,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = board_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task content.
    pub content: String,
    /// Owning column.
    pub column_id: uuid::Uuid,
    /// Position within the owning column.
    pub order_index: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = board_tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task content.
    pub content: String,
    /// Owning column.
    pub column_id: uuid::Uuid,
    /// Position within the owning column.
    pub order_index: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewColumnRow {
    /// Builds the insert row for a placed column.
    pub fn from_domain(column: &Column) -> BoardStoreResult<Self> {
        Ok(Self {
            id: column.id().into_inner(),
            title: column.title().as_str().to_owned(),
            order_index: order_to_stored(column.order())?,
        })
    }
}

impl NewTaskRow {
    /// Builds the insert row for a placed task.
    pub fn from_domain(task: &Task) -> BoardStoreResult<Self> {
        Ok(Self {
            id: task.id().into_inner(),
            content: task.content().as_str().to_owned(),
            column_id: task.column_id().into_inner(),
            order_index: order_to_stored(task.order())?,
            created_at: task.created_at(),
        })
    }
}

/// Converts a column row into a domain column without tasks.
///
/// Titles are re-validated without a length limit; the configured limit
/// applies when a column is created, not when it is read back.
pub fn row_to_column(row: ColumnRow) -> BoardStoreResult<Column> {
    let ColumnRow {
        id,
        title,
        order_index,
    } = row;
    let validated =
        ColumnTitle::with_limit(title, usize::MAX).map_err(BoardStoreError::persistence)?;
    Ok(Column::from_persisted(PersistedColumnData {
        id: ColumnId::from_uuid(id),
        title: validated,
        order: order_from_stored(order_index)?,
    }))
}

/// Converts a task row into a domain task.
pub fn row_to_task(row: TaskRow) -> BoardStoreResult<Task> {
    let TaskRow {
        id,
        content,
        column_id,
        order_index,
        created_at,
    } = row;
    let validated =
        TaskContent::with_limit(content, usize::MAX).map_err(BoardStoreError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        content: validated,
        column_id: ColumnId::from_uuid(column_id),
        order: order_from_stored(order_index)?,
        created_at,
    }))
}

/// Converts a stored order value into an [`OrderIndex`].
pub fn order_from_stored(value: i32) -> BoardStoreResult<OrderIndex> {
    u32::try_from(value)
        .map(OrderIndex::new)
        .map_err(|_| BoardStoreError::InvalidOrder(i64::from(value)))
}

/// Converts an [`OrderIndex`] into its stored representation.
pub fn order_to_stored(order: OrderIndex) -> BoardStoreResult<i32> {
    i32::try_from(order.value())
        .map_err(|_| BoardStoreError::Constraint(format!("order index {order} exceeds INTEGER range")))
}
