//! Then steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, names, run_async};
use corkboard::board::{
    domain::{Board, OrderIndex, ordering},
    services::BoardErrorKind,
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn board(world: &BoardOrderingWorld) -> Result<Board, eyre::Report> {
    run_async(world.service.get_board()).wrap_err("load board")
}

fn failure_kind(world: &BoardOrderingWorld) -> Result<BoardErrorKind, eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) => Ok(err.kind()),
        Some(Ok(())) => Err(eyre::eyre!("expected the operation to fail")),
        None => Err(eyre::eyre!("missing operation result")),
    }
}

#[then(r#"column "{column}" holds tasks "{tasks}""#)]
fn column_holds_tasks(
    world: &BoardOrderingWorld,
    column: String,
    tasks: String,
) -> Result<(), eyre::Report> {
    let column_id = world.column_id(&column)?;
    let board = board(world)?;
    let found = board
        .column(column_id)
        .ok_or_else(|| eyre::eyre!("column {column} missing from board"))?;
    let actual: Vec<String> = found
        .tasks()
        .iter()
        .map(|task| world.task_name(task.id()))
        .collect();
    let expected = names(&tasks);
    if actual != expected {
        return Err(eyre::eyre!(
            "column {column}: expected {expected:?}, found {actual:?}"
        ));
    }
    Ok(())
}

#[then("every scope is densely ordered")]
fn every_scope_is_dense(world: &BoardOrderingWorld) -> Result<(), eyre::Report> {
    let board = board(world)?;
    if !ordering::is_contiguous(board.columns().iter().map(|column| column.order())) {
        return Err(eyre::eyre!("column orders are not contiguous"));
    }
    for column in board.columns() {
        if !ordering::is_contiguous(column.tasks().iter().map(|task| task.order())) {
            return Err(eyre::eyre!(
                "task orders in column {} are not contiguous",
                world.column_name(column.id())
            ));
        }
    }
    Ok(())
}

#[then(r#"column "{column}" is at position {position:u64}"#)]
fn column_is_at_position(
    world: &BoardOrderingWorld,
    column: String,
    position: u64,
) -> Result<(), eyre::Report> {
    let column_id = world.column_id(&column)?;
    let expected = OrderIndex::new(u32::try_from(position)?);
    let found = run_async(world.service.find_column(column_id))
        .wrap_err("find column")?
        .ok_or_else(|| eyre::eyre!("column {column} no longer exists"))?;
    if found.order() != expected {
        return Err(eyre::eyre!(
            "column {column}: expected position {position}, found {}",
            found.order()
        ));
    }
    Ok(())
}

#[then(r#"task "{task}" no longer exists"#)]
fn task_no_longer_exists(world: &BoardOrderingWorld, task: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&task)?;
    let found = run_async(world.service.find_task(task_id)).wrap_err("find task")?;
    if found.is_some() {
        return Err(eyre::eyre!("task {task} still exists"));
    }
    Ok(())
}

#[then("the board has {count:usize} columns")]
fn board_has_columns(world: &BoardOrderingWorld, count: usize) -> Result<(), eyre::Report> {
    let actual = board(world)?.columns().len();
    if actual != count {
        return Err(eyre::eyre!("expected {count} columns, found {actual}"));
    }
    Ok(())
}

#[then("the board has {count:usize} tasks")]
fn board_has_tasks(world: &BoardOrderingWorld, count: usize) -> Result<(), eyre::Report> {
    let actual = board(world)?.task_count();
    if actual != count {
        return Err(eyre::eyre!("expected {count} tasks, found {actual}"));
    }
    Ok(())
}

#[then(r#"the columns are ordered "{columns}""#)]
fn columns_are_ordered(world: &BoardOrderingWorld, columns: String) -> Result<(), eyre::Report> {
    let actual: Vec<String> = board(world)?
        .columns()
        .iter()
        .map(|column| world.column_name(column.id()))
        .collect();
    let expected = names(&columns);
    if actual != expected {
        return Err(eyre::eyre!("expected columns {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then("the operation fails with a not found error")]
fn operation_fails_not_found(world: &BoardOrderingWorld) -> Result<(), eyre::Report> {
    let kind = failure_kind(world)?;
    if kind != BoardErrorKind::NotFound {
        return Err(eyre::eyre!("expected a not found error, found {kind:?}"));
    }
    Ok(())
}

#[then("the operation fails with a validation error")]
fn operation_fails_validation(world: &BoardOrderingWorld) -> Result<(), eyre::Report> {
    let kind = failure_kind(world)?;
    if kind != BoardErrorKind::Validation {
        return Err(eyre::eyre!("expected a validation error, found {kind:?}"));
    }
    Ok(())
}
