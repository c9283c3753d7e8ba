//! Read-derived board aggregate.

use super::{Column, ColumnId, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The board: every column in order, each holding its tasks in order.
///
/// A board is never persisted as such. It is assembled from the column and
/// task rows of one consistent [`BoardSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Returns the columns in board order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consumes the board, returning its columns in order.
    #[must_use]
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Finds a column by identifier.
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id() == id)
    }

    /// Finds a task by identifier in any column.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(Column::tasks)
            .find(|task| task.id() == id)
    }

    /// Returns the total number of tasks across all columns.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks().len()).sum()
    }
}

/// Column and task rows read from a single consistent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Column rows, in any order.
    pub columns: Vec<Column>,
    /// Task rows, in any order.
    pub tasks: Vec<Task>,
}

impl BoardSnapshot {
    /// Returns the tasks whose column is not part of the snapshot.
    ///
    /// Always empty while referential integrity holds.
    #[must_use]
    pub fn orphaned_tasks(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|task| !self.columns.iter().any(|c| c.id() == task.column_id()))
            .map(Task::id)
            .collect()
    }

    /// Joins tasks onto their columns, sorting both levels by order.
    ///
    /// Orphaned tasks are left out of the board.
    #[must_use]
    pub fn into_board(self) -> Board {
        let Self {
            mut columns,
            tasks,
        } = self;
        let mut grouped: HashMap<ColumnId, Vec<Task>> = HashMap::new();
        for task in tasks {
            grouped.entry(task.column_id()).or_default().push(task);
        }
        columns.sort_by_key(Column::order);
        let columns = columns
            .into_iter()
            .map(|column| {
                let column_tasks = grouped.remove(&column.id()).unwrap_or_default();
                column.with_tasks(column_tasks)
            })
            .collect();
        Board { columns }
    }
}

/// Request to place a task at `target_index` in `target_column_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTask {
    /// Task being moved.
    pub task_id: TaskId,
    /// Column receiving the task; may be its current column.
    pub target_column_id: ColumnId,
    /// Requested position, clamped to the end of the target column.
    pub target_index: usize,
}

impl MoveTask {
    /// Creates a move request.
    #[must_use]
    pub const fn new(task_id: TaskId, target_column_id: ColumnId, target_index: usize) -> Self {
        Self {
            task_id,
            target_column_id,
            target_index,
        }
    }
}

/// Number of persisted rows a mutation rewrote to restore contiguous order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Renumbering {
    rows_updated: usize,
}

impl Renumbering {
    /// A mutation that rewrote nothing.
    pub const UNCHANGED: Self = Self { rows_updated: 0 };

    /// Creates a summary for `rows_updated` rewritten rows.
    #[must_use]
    pub const fn new(rows_updated: usize) -> Self {
        Self { rows_updated }
    }

    /// Returns how many rows were rewritten.
    #[must_use]
    pub const fn rows_updated(self) -> usize {
        self.rows_updated
    }

    /// Returns `true` when nothing was rewritten.
    #[must_use]
    pub const fn is_unchanged(self) -> bool {
        self.rows_updated == 0
    }
}
