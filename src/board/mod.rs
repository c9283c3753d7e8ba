//! Ordered board of columns and tasks.
//!
//! Columns are ordered on the board and tasks are ordered within their
//! column. Every mutation renumbers the affected scope densely and commits
//! atomically, so orders always read `0..n` within each scope. The module
//! follows hexagonal architecture:
//!
//! - Domain types and the ordering engine in [`domain`]
//! - The store contract in [`ports`]
//! - In-memory and `PostgreSQL` stores in [`adapters`]
//! - Validation and retry orchestration in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
