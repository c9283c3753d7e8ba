//! `PostgreSQL` adapter for board persistence.
//!
//! Mutations run in `READ COMMITTED` transactions that lock the scopes they
//! renumber before reading them. The deferred uniqueness constraints in the
//! schema reject any commit that would still leave duplicate order values.

mod errors;
mod models;
mod schema;
mod store;

pub use store::{BoardPgPool, PostgresBoardStore};

/// SQL that creates the board tables on an empty database.
pub const CREATE_BOARD_TABLES_SQL: &str =
    include_str!("../../../../migrations/2026-10-14-000000_create_board_tables/up.sql");
