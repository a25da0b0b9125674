//! `tsk show` — show one todo in full.

use clap::Args;
use std::io::Write;

use crate::output::{OutputMode, fail, render};
use crate::runtime::Ctx;
use taskpipe_core::api::TodoResponse;
use taskpipe_core::model::TaskId;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Id of the todo to show.
    pub id: TaskId,
}

pub fn run_show(args: &ShowArgs, ctx: &Ctx, output: OutputMode) -> anyhow::Result<()> {
    match ctx.pipeline.get(ctx.actor, ctx.owner, args.id) {
        Ok(task) => render(output, &TodoResponse::from(&task), |v, w| {
            writeln!(w, "id:          {}", v.id)?;
            writeln!(w, "title:       {}", v.title)?;
            if let Some(description) = &v.description {
                writeln!(w, "description: {description}")?;
            }
            writeln!(w, "completed:   {}", v.completed)?;
            writeln!(w, "created:     {}", v.created_at)?;
            writeln!(w, "updated:     {}", v.updated_at)
        }),
        Err(ref error) => fail(output, error),
    }
}
