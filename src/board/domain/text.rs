//! Validated text values for column titles and task content.

use super::BoardDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default upper bound on column title length, in characters.
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 255;

/// Default upper bound on task content length, in characters.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 10_000;

/// Trimmed, non-empty column title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnTitle(String);

impl ColumnTitle {
    /// Creates a title using [`DEFAULT_MAX_TITLE_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] or
    /// [`BoardDomainError::TitleTooLong`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, BoardDomainError> {
        Self::with_limit(value, DEFAULT_MAX_TITLE_LENGTH)
    }

    /// Creates a title bounded by `max_chars` characters after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] when the trimmed value is
    /// empty, or [`BoardDomainError::TitleTooLong`] when it exceeds
    /// `max_chars`.
    pub fn with_limit(value: impl AsRef<str>, max_chars: usize) -> Result<Self, BoardDomainError> {
        validated(value.as_ref(), max_chars)
            .map(Self)
            .map_err(|rejection| match rejection {
                Rejection::Empty => BoardDomainError::EmptyTitle,
                Rejection::TooLong { max, actual } => {
                    BoardDomainError::TitleTooLong { max, actual }
                }
            })
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ColumnTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ColumnTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trimmed, non-empty task content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskContent(String);

impl TaskContent {
    /// Creates content using [`DEFAULT_MAX_CONTENT_LENGTH`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyContent`] or
    /// [`BoardDomainError::ContentTooLong`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, BoardDomainError> {
        Self::with_limit(value, DEFAULT_MAX_CONTENT_LENGTH)
    }

    /// Creates content bounded by `max_chars` characters after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyContent`] when the trimmed value is
    /// empty, or [`BoardDomainError::ContentTooLong`] when it exceeds
    /// `max_chars`.
    pub fn with_limit(value: impl AsRef<str>, max_chars: usize) -> Result<Self, BoardDomainError> {
        validated(value.as_ref(), max_chars)
            .map(Self)
            .map_err(|rejection| match rejection {
                Rejection::Empty => BoardDomainError::EmptyContent,
                Rejection::TooLong { max, actual } => {
                    BoardDomainError::ContentTooLong { max, actual }
                }
            })
    }

    /// Returns the content as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskContent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a text value was refused, before it is named for its field.
enum Rejection {
    Empty,
    TooLong { max: usize, actual: usize },
}

/// Trims `value` and checks it is non-empty and at most `max_chars` long.
fn validated(value: &str, max_chars: usize) -> Result<String, Rejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Empty);
    }
    let actual = trimmed.chars().count();
    if actual > max_chars {
        return Err(Rejection::TooLong {
            max: max_chars,
            actual,
        });
    }
    Ok(trimmed.to_owned())
}
