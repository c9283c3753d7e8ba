//! Schema violations reported by `PostgreSQL` and their store errors.

use super::helpers::{BoxError, board, test_schema};
use corkboard::board::ports::BoardStoreError;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use rstest::rstest;
use uuid::Uuid;

#[rstest]
#[ignore = "requires a PostgreSQL server at CORKBOARD_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn task_in_unknown_column_is_a_constraint_error() -> Result<(), BoxError> {
    let schema = test_schema()?;
    let mut conn = schema.connect()?;

    let result = conn
        .batch_execute(&format!(
            "INSERT INTO board_tasks (id, content, column_id, order_index) \
             VALUES ('{}', 'stray', '{}', 0)",
            Uuid::new_v4(),
            Uuid::new_v4()
        ))
        .map_err(BoardStoreError::from);

    assert!(
        matches!(result, Err(BoardStoreError::Constraint(_))),
        "expected constraint error, got {result:?}"
    );
    assert_eq!(board(schema.store()).await?.task_count(), 0);
    Ok(())
}

#[rstest]
#[ignore = "requires a PostgreSQL server at CORKBOARD_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn negative_order_is_a_constraint_error() -> Result<(), BoxError> {
    let schema = test_schema()?;
    let mut conn = schema.connect()?;

    let result = conn
        .batch_execute(&format!(
            "INSERT INTO board_columns (id, title, order_index) VALUES ('{}', 'Below', -1)",
            Uuid::new_v4()
        ))
        .map_err(BoardStoreError::from);

    assert!(
        matches!(result, Err(BoardStoreError::Constraint(_))),
        "expected constraint error, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[case::columns(
    "INSERT INTO board_columns (id, title, order_index) VALUES \
     ('{a}', 'One', 0), ('{b}', 'Two', 0)"
)]
#[case::tasks(
    "INSERT INTO board_columns (id, title, order_index) VALUES ('{a}', 'Only', 0); \
     INSERT INTO board_tasks (id, content, column_id, order_index) VALUES \
     ('{b}', 'first', '{a}', 0), ('{c}', 'second', '{a}', 0)"
)]
#[ignore = "requires a PostgreSQL server at CORKBOARD_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_order_rejected_at_commit_is_a_conflict(
    #[case] template: &str,
) -> Result<(), BoxError> {
    let schema = test_schema()?;
    let mut conn = schema.connect()?;
    let sql = template
        .replace("{a}", &Uuid::new_v4().to_string())
        .replace("{b}", &Uuid::new_v4().to_string())
        .replace("{c}", &Uuid::new_v4().to_string());

    let result = conn
        .transaction::<(), diesel::result::Error, _>(|tx| tx.batch_execute(&sql))
        .map_err(BoardStoreError::from);

    assert!(
        matches!(result, Err(BoardStoreError::Conflict(_))),
        "expected conflict, got {result:?}"
    );
    let after = board(schema.store()).await?;
    assert!(after.columns().is_empty());
    assert_eq!(after.task_count(), 0);
    Ok(())
}
