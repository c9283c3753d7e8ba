//! Domain model for the board ordering engine.
//!
//! Columns are ordered on the board and tasks are ordered within their
//! column. The [`ordering`] functions compute dense renumberings for both
//! scopes; everything else here is plain data with validated constructors.

mod board;
mod column;
mod error;
mod ids;
pub mod ordering;
mod task;
mod text;

pub use board::{Board, BoardSnapshot, MoveTask, Renumbering};
pub use column::{Column, ColumnDraft, PersistedColumnData};
pub use error::{BoardDomainError, OrderingError};
pub use ids::{ColumnId, OrderIndex, TaskId};
pub use task::{PersistedTaskData, Task, TaskDraft};
pub use text::{ColumnTitle, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_TITLE_LENGTH, TaskContent};

/// Validates a caller-supplied target index.
///
/// # Errors
///
/// Returns [`BoardDomainError::InvalidIndex`] when `index` is negative.
pub fn target_index(index: i64) -> Result<usize, BoardDomainError> {
    usize::try_from(index).or_else(|_| {
        if index < 0 {
            Err(BoardDomainError::InvalidIndex(index))
        } else {
            Ok(usize::MAX)
        }
    })
}
