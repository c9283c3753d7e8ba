//! Application services for board orchestration.

mod board;
mod config;

pub use board::{BoardErrorKind, BoardService, BoardServiceError, BoardServiceResult};
pub use config::BoardConfig;
