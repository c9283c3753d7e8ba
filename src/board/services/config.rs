//! Service-level board settings.

use crate::board::domain::{DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_TITLE_LENGTH};
use serde::Deserialize;

/// Validation limits and retry policy for [`super::BoardService`].
///
/// # Examples
///
/// ```
/// use corkboard::board::services::BoardConfig;
///
/// let config = BoardConfig::default();
/// assert_eq!(config.max_title_length, 255);
/// assert!(config.retry_on_conflict);
///
/// let strict = BoardConfig::strict();
/// assert!(!strict.retry_on_conflict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Maximum column title length in characters, after trimming.
    pub max_title_length: usize,
    /// Maximum task content length in characters, after trimming.
    pub max_content_length: usize,
    /// Whether a mutation that fails with a conflict is retried once.
    pub retry_on_conflict: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            retry_on_conflict: true,
        }
    }
}

impl BoardConfig {
    /// Creates a strict configuration with shorter limits and no retry.
    ///
    /// Conflicts surface to the caller on the first failure.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_title_length: 80,
            max_content_length: 2_000,
            retry_on_conflict: false,
        }
    }
}
