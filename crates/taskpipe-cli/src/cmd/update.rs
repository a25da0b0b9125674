//! `tsk update` — change a todo's title and/or description.

use clap::Args;
use std::io::Write;

use crate::output::{OutputMode, fail, render};
use crate::runtime::Ctx;
use taskpipe_core::api::TodoResponse;
use taskpipe_core::model::{TaskId, TaskPatch};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Id of the todo to update.
    pub id: TaskId,

    /// New title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description.
    #[arg(short, long)]
    pub description: Option<String>,
}

pub fn run_update(args: &UpdateArgs, ctx: &Ctx, output: OutputMode) -> anyhow::Result<()> {
    let patch = TaskPatch {
        title: args.title.clone(),
        description: args.description.clone(),
    };
    match ctx.pipeline.update(ctx.actor, ctx.owner, args.id, &patch) {
        Ok(mutated) => render(output, &TodoResponse::from(&mutated.value), |v, w| {
            writeln!(w, "Updated {}: {}", v.id, v.title)
        }),
        Err(ref error) => fail(output, error),
    }
}
