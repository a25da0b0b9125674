//! `tsk done` — toggle or set a todo's completion flag.

use clap::Args;
use std::io::Write;

use crate::output::{OutputMode, fail, render};
use crate::runtime::Ctx;
use taskpipe_core::api::TodoResponse;
use taskpipe_core::model::TaskId;

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Id of the todo.
    pub id: TaskId,

    /// Set the flag explicitly instead of flipping it.
    #[arg(long, value_name = "BOOL")]
    pub set: Option<bool>,
}

pub fn run_done(args: &DoneArgs, ctx: &Ctx, output: OutputMode) -> anyhow::Result<()> {
    match ctx.pipeline.set_completed(ctx.actor, ctx.owner, args.id, args.set) {
        Ok(mutated) => render(output, &TodoResponse::from(&mutated.value), |v, w| {
            let state = if v.completed { "completed" } else { "pending" };
            writeln!(w, "{}: {} is now {state}", v.id, v.title)
        }),
        Err(ref error) => fail(output, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_flag_parses_booleans() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: DoneArgs,
        }
        let id = TaskId::generate().to_string();
        let w = Wrapper::parse_from(["test", &id]);
        assert_eq!(w.args.set, None);

        let w = Wrapper::parse_from(["test", &id, "--set", "false"]);
        assert_eq!(w.args.set, Some(false));
    }
}
