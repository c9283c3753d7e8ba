//! Task entity and creation drafts.

use super::{ColumnId, OrderIndex, TaskContent, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A task card positioned within exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    content: TaskContent,
    column_id: ColumnId,
    order: OrderIndex,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted content.
    pub content: TaskContent,
    /// Owning column.
    pub column_id: ColumnId,
    /// Position within the owning column.
    pub order: OrderIndex,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            content: data.content,
            column_id: data.column_id,
            order: data.order,
            created_at: data.created_at,
        }
    }

    /// Builds the task a store appends for `draft` at `order` in `column_id`.
    #[must_use]
    pub fn from_draft(draft: TaskDraft, column_id: ColumnId, order: OrderIndex) -> Self {
        Self {
            id: draft.id,
            content: draft.content,
            column_id,
            order,
            created_at: draft.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task content.
    #[must_use]
    pub const fn content(&self) -> &TaskContent {
        &self.content
    }

    /// Returns the owning column.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the position within the owning column.
    #[must_use]
    pub const fn order(&self) -> OrderIndex {
        self.order
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A task that has not been placed yet.
///
/// The identifier and timestamp are fixed up front so that a retried
/// creation refers to the same task; the store assigns column and order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    id: TaskId,
    content: TaskContent,
    created_at: DateTime<Utc>,
}

impl TaskDraft {
    /// Creates a draft with a fresh identifier stamped from `clock`.
    #[must_use]
    pub fn new(content: TaskContent, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            content,
            created_at: clock.utc(),
        }
    }

    /// Returns the pre-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the draft content.
    #[must_use]
    pub const fn content(&self) -> &TaskContent {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
