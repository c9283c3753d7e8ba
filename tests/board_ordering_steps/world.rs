//! Shared world state for board ordering BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use corkboard::board::{
    adapters::memory::InMemoryBoardStore,
    domain::{ColumnId, TaskId},
    services::{BoardService, BoardServiceError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestBoardService = BoardService<InMemoryBoardStore, DefaultClock>;

/// Scenario world for board ordering behaviour tests.
pub struct BoardOrderingWorld {
    pub service: TestBoardService,
    pub columns: HashMap<String, ColumnId>,
    pub tasks: HashMap<String, TaskId>,
    pub last_result: Option<Result<(), BoardServiceError>>,
}

impl BoardOrderingWorld {
    /// Creates a world around an empty board.
    #[must_use]
    pub fn new() -> Self {
        let service =
            BoardService::new(Arc::new(InMemoryBoardStore::new()), Arc::new(DefaultClock));

        Self {
            service,
            columns: HashMap::new(),
            tasks: HashMap::new(),
            last_result: None,
        }
    }

    /// Resolves a column name used in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when the scenario never created the column.
    pub fn column_id(&self, name: &str) -> Result<ColumnId, eyre::Report> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown column {name} in scenario world"))
    }

    /// Resolves a task name used in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when the scenario never created the task.
    pub fn task_id(&self, name: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task {name} in scenario world"))
    }

    /// Maps a task identifier back to its scenario name.
    #[must_use]
    pub fn task_name(&self, id: TaskId) -> String {
        self.tasks
            .iter()
            .find_map(|(name, candidate)| (*candidate == id).then(|| name.clone()))
            .unwrap_or_else(|| id.to_string())
    }

    /// Maps a column identifier back to its scenario name.
    #[must_use]
    pub fn column_name(&self, id: ColumnId) -> String {
        self.columns
            .iter()
            .find_map(|(name, candidate)| (*candidate == id).then(|| name.clone()))
            .unwrap_or_else(|| id.to_string())
    }
}

impl Default for BoardOrderingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardOrderingWorld {
    BoardOrderingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Splits a comma-separated list of scenario names.
#[must_use]
pub fn names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}
