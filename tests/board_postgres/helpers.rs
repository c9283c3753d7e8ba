//! Shared helpers for `PostgreSQL` board integration tests.

use corkboard::board::{
    adapters::postgres::{BoardPgPool, CREATE_BOARD_TABLES_SQL, PostgresBoardStore},
    domain::{Board, ordering},
    ports::{BoardStore, StoreConfig},
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use uuid::Uuid;

/// Environment variable naming the test server.
pub const DATABASE_URL_ENV: &str = "CORKBOARD_TEST_DATABASE_URL";

/// Boxed error type used by test helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A store bound to a private schema, dropped with the schema.
pub struct TestSchema {
    admin_url: String,
    schema_url: String,
    schema: String,
    store: PostgresBoardStore,
}

impl TestSchema {
    /// Returns the store under test.
    #[must_use]
    pub const fn store(&self) -> &PostgresBoardStore {
        &self.store
    }

    /// Opens a connection whose search path is the private schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn connect(&self) -> Result<PgConnection, BoxError> {
        PgConnection::establish(&self.schema_url).map_err(|err| Box::new(err) as BoxError)
    }

    /// Builds another store over the same schema with different settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built.
    pub fn store_with(&self, config: StoreConfig) -> Result<PostgresBoardStore, BoxError> {
        Ok(PostgresBoardStore::with_config(pool(&self.schema_url)?, config))
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        if let Ok(mut conn) = PgConnection::establish(&self.admin_url) {
            let drop_sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema);
            if conn.batch_execute(&drop_sql).is_err() {
                tracing::warn!(schema = %self.schema, "failed to drop test schema");
            }
        }
    }
}

fn pool(url: &str) -> Result<BoardPgPool, BoxError> {
    Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(|err| Box::new(err) as BoxError)
}

fn with_search_path(url: &str, schema: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}options=-c%20search_path%3D{schema}")
}

/// Creates a private schema with the board tables.
///
/// # Errors
///
/// Returns an error if [`DATABASE_URL_ENV`] is unset or the schema cannot be
/// prepared.
pub fn test_schema() -> Result<TestSchema, BoxError> {
    let admin_url = std::env::var(DATABASE_URL_ENV)
        .map_err(|err| format!("{DATABASE_URL_ENV} must name a test server: {err}"))?;
    let schema = format!("corkboard_test_{}", Uuid::new_v4().simple());
    let mut admin = PgConnection::establish(&admin_url).map_err(|err| Box::new(err) as BoxError)?;
    admin
        .batch_execute(&format!("CREATE SCHEMA {schema}"))
        .map_err(|err| Box::new(err) as BoxError)?;

    let schema_url = with_search_path(&admin_url, &schema);
    let mut conn = PgConnection::establish(&schema_url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_BOARD_TABLES_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;

    let store = PostgresBoardStore::new(pool(&schema_url)?);
    Ok(TestSchema {
        admin_url,
        schema_url,
        schema,
        store,
    })
}

/// Loads and assembles the board from `store`.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read.
pub async fn board(store: &PostgresBoardStore) -> Result<Board, BoxError> {
    Ok(store.load_snapshot().await?.into_board())
}

/// Returns `true` when every scope of `board` is densely ordered.
#[must_use]
pub fn is_dense(board: &Board) -> bool {
    ordering::is_contiguous(board.columns().iter().map(|column| column.order()))
        && board.columns().iter().all(|column| {
            ordering::is_contiguous(column.tasks().iter().map(|task| task.order()))
        })
}
