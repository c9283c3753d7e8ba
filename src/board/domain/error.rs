//! Error types for board domain validation and ordering.

use thiserror::Error;

/// Errors returned while constructing validated board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The column title is empty after trimming.
    #[error("column title must not be empty")]
    EmptyTitle,

    /// The column title exceeds the configured limit.
    #[error("column title has {actual} characters, exceeds limit of {max}")]
    TitleTooLong {
        /// The maximum allowed number of characters.
        max: usize,
        /// The actual number of characters.
        actual: usize,
    },

    /// The task content is empty after trimming.
    #[error("task content must not be empty")]
    EmptyContent,

    /// The task content exceeds the configured limit.
    #[error("task content has {actual} characters, exceeds limit of {max}")]
    ContentTooLong {
        /// The maximum allowed number of characters.
        max: usize,
        /// The actual number of characters.
        actual: usize,
    },

    /// A target index supplied by the caller is negative.
    #[error("invalid target index {0}, expected a non-negative integer")]
    InvalidIndex(i64),
}

/// Error returned by the ordering algorithm when an item is missing.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// The item is not part of the expected sequence.
    #[error("item is not present in the ordered sequence")]
    NotFound,

    /// The sequence is longer than the order index range.
    #[error("sequence length exceeds the order index range")]
    CapacityExceeded,
}
