//! When steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, run_async};
use corkboard::board::domain::ColumnId;
use rstest_bdd_macros::when;

fn index(position: u64) -> Result<i64, eyre::Report> {
    i64::try_from(position).map_err(|err| eyre::eyre!("position {position} out of range: {err}"))
}

#[when(r#"task "{task}" is moved to column "{column}" at position {position:u64}"#)]
fn task_is_moved(
    world: &mut BoardOrderingWorld,
    task: String,
    column: String,
    position: u64,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&task)?;
    let column_id = world.column_id(&column)?;
    let target = index(position)?;
    world.last_result = Some(run_async(
        world.service.move_task(task_id, column_id, target),
    ));
    Ok(())
}

#[when(r#"task "{task}" is moved to a negative position in column "{column}""#)]
fn task_is_moved_to_negative_position(
    world: &mut BoardOrderingWorld,
    task: String,
    column: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&task)?;
    let column_id = world.column_id(&column)?;
    world.last_result = Some(run_async(world.service.move_task(task_id, column_id, -1)));
    Ok(())
}

#[when(r#"column "{column}" is deleted"#)]
fn column_is_deleted(world: &mut BoardOrderingWorld, column: String) -> Result<(), eyre::Report> {
    let column_id = world.column_id(&column)?;
    world.last_result = Some(run_async(world.service.delete_column(column_id)));
    Ok(())
}

#[when(r#"column "{column}" is moved to position {position:u64}"#)]
fn column_is_moved(
    world: &mut BoardOrderingWorld,
    column: String,
    position: u64,
) -> Result<(), eyre::Report> {
    let column_id = world.column_id(&column)?;
    let target = index(position)?;
    world.last_result = Some(run_async(world.service.reorder_column(column_id, target)));
    Ok(())
}

#[when(r#"a task "{content}" is created in a missing column"#)]
fn task_created_in_missing_column(world: &mut BoardOrderingWorld, content: String) {
    let result = run_async(world.service.create_task(ColumnId::new(), &content));
    world.last_result = Some(result.map(|_| ()));
}
