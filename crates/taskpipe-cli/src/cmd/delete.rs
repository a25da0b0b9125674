//! `tsk rm` — delete a todo.

use clap::Args;
use std::io::Write;

use crate::output::{OutputMode, fail, render};
use crate::runtime::Ctx;
use taskpipe_core::api::DeleteTodoResponse;
use taskpipe_core::model::TaskId;

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Id of the todo to delete.
    pub id: TaskId,
}

pub fn run_rm(args: &RmArgs, ctx: &Ctx, output: OutputMode) -> anyhow::Result<()> {
    match ctx.pipeline.delete(ctx.actor, ctx.owner, args.id) {
        Ok(mutated) => render(output, &DeleteTodoResponse::deleted(), |_, w| {
            writeln!(w, "Deleted {}: {}", mutated.value.id, mutated.value.title)
        }),
        Err(ref error) => fail(output, error),
    }
}
