//! `tsk list` — list todos with an optional completion filter.

use clap::Args;
use std::io::Write;

use crate::output::{OutputMode, fail, render};
use crate::runtime::Ctx;
use taskpipe_core::api::TodoListResponse;
use taskpipe_core::model::TaskFilter;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Completion filter: all, completed, or pending.
    #[arg(long, default_value = "all")]
    pub filter: TaskFilter,
}

pub fn run_list(args: &ListArgs, ctx: &Ctx, output: OutputMode) -> anyhow::Result<()> {
    match ctx.pipeline.list(ctx.actor, ctx.owner, args.filter) {
        Ok(tasks) => render(output, &TodoListResponse::from_tasks(&tasks), |v, w| {
            for todo in &v.todos {
                let mark = if todo.completed { "x" } else { " " };
                writeln!(w, "[{mark}] {}  {}", todo.id, todo.title)?;
            }
            writeln!(w, "{} todo(s)", v.count)
        }),
        Err(ref error) => fail(output, error),
    }
}
