//! Column entity and creation drafts.

use super::{ColumnId, ColumnTitle, OrderIndex, Task};
use serde::{Deserialize, Serialize};

/// A named column positioned on the board.
///
/// `tasks` is filled in when the column is read as part of a
/// [`Board`](super::Board); point lookups and freshly created columns carry
/// no tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    title: ColumnTitle,
    order: OrderIndex,
    tasks: Vec<Task>,
}

/// Parameter object for reconstructing a persisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedColumnData {
    /// Persisted column identifier.
    pub id: ColumnId,
    /// Persisted title.
    pub title: ColumnTitle,
    /// Position on the board.
    pub order: OrderIndex,
}

impl Column {
    /// Reconstructs a column from persisted storage, without tasks.
    #[must_use]
    pub fn from_persisted(data: PersistedColumnData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            order: data.order,
            tasks: Vec::new(),
        }
    }

    /// Builds the column a store appends for `draft` at `order`.
    #[must_use]
    pub fn from_draft(draft: ColumnDraft, order: OrderIndex) -> Self {
        Self {
            id: draft.id,
            title: draft.title,
            order,
            tasks: Vec::new(),
        }
    }

    /// Attaches the column's tasks, sorted by order.
    #[must_use]
    pub fn with_tasks(mut self, mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(Task::order);
        self.tasks = tasks;
        self
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the column title.
    #[must_use]
    pub const fn title(&self) -> &ColumnTitle {
        &self.title
    }

    /// Returns the position on the board.
    #[must_use]
    pub const fn order(&self) -> OrderIndex {
        self.order
    }

    /// Returns the column's tasks in order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

/// A column that has not been placed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDraft {
    id: ColumnId,
    title: ColumnTitle,
}

impl ColumnDraft {
    /// Creates a draft with a fresh identifier.
    #[must_use]
    pub fn new(title: ColumnTitle) -> Self {
        Self {
            id: ColumnId::new(),
            title,
        }
    }

    /// Returns the pre-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the draft title.
    #[must_use]
    pub const fn title(&self) -> &ColumnTitle {
        &self.title
    }
}
