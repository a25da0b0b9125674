//! `tsk add` — create a new todo.

use clap::Args;
use std::io::Write;

use crate::output::{OutputMode, fail, render};
use crate::runtime::Ctx;
use taskpipe_core::api::TodoResponse;
use taskpipe_core::model::TaskDraft;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Title of the new todo.
    pub title: String,

    /// Description text.
    #[arg(short, long)]
    pub description: Option<String>,
}

pub fn run_add(args: &AddArgs, ctx: &Ctx, output: OutputMode) -> anyhow::Result<()> {
    let draft = TaskDraft::new(args.title.clone(), args.description.clone());
    match ctx.pipeline.create(ctx.actor, ctx.owner, &draft) {
        Ok(mutated) => render(output, &TodoResponse::from(&mutated.value), |v, w| {
            writeln!(w, "Created {}: {}", v.id, v.title)
        }),
        Err(ref error) => fail(output, error),
    }
}
