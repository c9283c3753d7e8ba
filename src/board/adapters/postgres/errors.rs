//! Mapping of Diesel failures onto the board store error taxonomy.

use crate::board::ports::BoardStoreError;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Deferred constraints guarding order uniqueness within each scope.
const ORDER_CONSTRAINTS: [&str; 2] = ["board_columns_order_unique", "board_tasks_column_order_unique"];

/// Server messages for lock waits that ended without the lock.
///
/// Diesel reports `lock_not_available` and `deadlock_detected` as
/// [`DatabaseErrorKind::Unknown`] without their SQLSTATE, so these are
/// matched on the server text. The match assumes the server's
/// `lc_messages` is English; under another locale both surface as
/// [`BoardStoreError::Persistence`] instead of a conflict.
const LOCK_CONTENTION_MESSAGES: [&str; 2] = ["lock timeout", "deadlock detected"];

impl From<DieselError> for BoardStoreError {
    fn from(err: DieselError) -> Self {
        classify(&err).unwrap_or_else(|| Self::persistence(err))
    }
}

/// Returns the semantic error for `err`, or `None` when it is an opaque
/// persistence failure.
fn classify(err: &DieselError) -> Option<BoardStoreError> {
    let DieselError::DatabaseError(kind, info) = err else {
        return None;
    };
    let message = info.message();
    match kind {
        DatabaseErrorKind::SerializationFailure => Some(conflict(message)),
        DatabaseErrorKind::UniqueViolation if is_order_constraint(info.as_ref()) => {
            Some(conflict(message))
        }
        DatabaseErrorKind::UniqueViolation
        | DatabaseErrorKind::ForeignKeyViolation
        | DatabaseErrorKind::CheckViolation
        | DatabaseErrorKind::NotNullViolation => {
            Some(BoardStoreError::Constraint(message.to_owned()))
        }
        _ if is_lock_contention(message) => Some(conflict(message)),
        _ => None,
    }
}

fn conflict(message: &str) -> BoardStoreError {
    debug!(reason = message, "database reported a conflicting concurrent mutation");
    BoardStoreError::conflict(message)
}

fn is_order_constraint(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| ORDER_CONSTRAINTS.contains(&name))
}

fn is_lock_contention(message: &str) -> bool {
    LOCK_CONTENTION_MESSAGES
        .iter()
        .any(|needle| message.contains(needle))
}
