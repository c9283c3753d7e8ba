//! Corkboard: ordering engine for a Kanban-style board.
//!
//! This crate keeps columns on a board, and tasks within each column, in a
//! dense total order that survives concurrent mutation.
//!
//! # Architecture
//!
//! Corkboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`board`]: Columns, tasks and their transactional reordering

pub mod board;
